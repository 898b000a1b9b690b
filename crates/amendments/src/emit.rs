//! Record emission: finalized amendments to the JSON wire format.

use crate::{AmendError, Amendment};

/// Output formatting mode.  Affects whitespace only, never content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// Human-readable, 2-space indentation.
    #[default]
    Indented,
    /// Single-line, minimal whitespace.
    Compact,
}

/// Serialize the records as a JSON array, preserving record order, field
/// order, and warning order.
pub fn to_json(amendments: &[Amendment], style: JsonStyle) -> Result<String, AmendError> {
    let json = match style {
        JsonStyle::Indented => serde_json::to_string_pretty(amendments)?,
        JsonStyle::Compact => serde_json::to_string(amendments)?,
    };
    Ok(json)
}

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// A single run of positioned text coming out of the fragment source.
///
/// Coordinates use a top-left origin: y grows downward, matching the
/// layout thresholds in [`crate::LayoutConfig`].
#[derive(Debug, Clone)]
pub struct Fragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// 1-based page number.
    pub page: u32,
    pub font_size: f32,
    pub bold: bool,
}

/// One logical row of text: fragments on the same page whose y
/// coordinates fall within the line tolerance, ordered left to right.
#[derive(Debug, Clone)]
pub struct Line {
    pub page: u32,
    pub y: f32,
    pub fragments: Vec<Fragment>,
}

impl Line {
    /// Concatenate all fragment texts with a single space separator.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// Leftmost fragment x.
    pub fn min_x(&self) -> f32 {
        self.fragments
            .iter()
            .map(|f| f.x)
            .fold(f32::INFINITY, f32::min)
    }

    /// Largest font size on the line.
    pub fn max_font_size(&self) -> f32 {
        self.fragments
            .iter()
            .map(|f| f.font_size)
            .fold(0.0, f32::max)
    }

    /// True only when every fragment on the line is bold.
    pub fn is_bold(&self) -> bool {
        self.fragments.iter().all(|f| f.bold)
    }
}

/// Per-amendment data-quality diagnostic.
///
/// Serialized as its [`fmt::Display`] string so the wire format stays a
/// plain list of `tag` / `tag: detail` strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Header numbering gap or reorder relative to the previous header.
    NonSequentialId { expected: u32, got: u32 },
    /// No author text was captured for this amendment.
    MissingAuthor,
    /// Neither the original nor the proposed column captured any text.
    BothColumnsEmpty,
    /// A populated column is implausibly short and is not "deleted".
    SuspiciouslyShortColumn,
    /// The closing "Or. xx" language line was never seen.
    NoLanguageMarker,
    /// Fragments fell inside the ambiguous band around the column split.
    AmbiguousColumnSplit { count: usize, xs: Vec<i32> },
    /// A document/page code pattern leaked into captured body text.
    FooterTextLeaked,
}

impl Warning {
    /// The stable tag, i.e. the part of the wire string before any colon.
    pub fn tag(&self) -> &'static str {
        match self {
            Warning::NonSequentialId { .. } => "non_sequential_id",
            Warning::MissingAuthor => "missing_author",
            Warning::BothColumnsEmpty => "both_columns_empty",
            Warning::SuspiciouslyShortColumn => "suspiciously_short_column",
            Warning::NoLanguageMarker => "no_language_marker",
            Warning::AmbiguousColumnSplit { .. } => "ambiguous_column_split",
            Warning::FooterTextLeaked => "footer_text_leaked",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NonSequentialId { expected, got } => {
                write!(f, "non_sequential_id: expected {}, got {}", expected, got)
            }
            Warning::AmbiguousColumnSplit { count, xs } => {
                let xs_str = xs
                    .iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "ambiguous_column_split: {} fragments near boundary at x\u{2248}{}",
                    count, xs_str
                )
            }
            other => write!(f, "{}", other.tag()),
        }
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One finalized amendment record.
///
/// Field order is part of the output contract: `id`, `authors`,
/// `section`, `content`, `amendment`, `warnings`, always all present,
/// empty strings rather than nulls.
#[derive(Debug, Clone, Serialize)]
pub struct Amendment {
    /// `"Amendment <N>"` as it appears in the header line.
    pub id: String,
    /// Semicolon-joined author entries; comma-wrapped continuations are
    /// joined with a space instead.
    pub authors: String,
    /// Slash-joined legislative reference parts.
    pub section: String,
    /// Left-column ("original") text, one source line per output line.
    pub content: String,
    /// Right-column ("proposed") text, one source line per output line.
    pub amendment: String,
    #[serde(serialize_with = "serialize_warnings")]
    pub warnings: Vec<Warning>,
}

fn serialize_warnings<S: Serializer>(
    warnings: &[Warning],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(warnings.len()))?;
    for w in warnings {
        seq.serialize_element(w)?;
    }
    seq.end()
}

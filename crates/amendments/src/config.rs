//! Layout constants for the two-column amendment table.
//!
//! All thresholds are in PDF points with a top-left origin (y grows
//! downward).  The defaults match the European Parliament committee
//! amendment template; a different document family can be supported by
//! constructing a modified [`LayoutConfig`] and passing it through the
//! pipeline -- none of the thresholds are hard-coded at the use sites.

/// Tunable layout parameters for fragment filtering, line assembly, and
/// column classification.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Fragments below this y coordinate are page furniture (footers) and
    /// are dropped before line assembly.  The true footer sits at y ~ 771.
    pub footer_y: f32,
    /// Fragments at or above this font size are watermarks (the full-page
    /// "EN" language mark) and are dropped.
    pub watermark_font_size: f32,
    /// Horizontal split between the original-text column (x < split) and
    /// the amendment column (x >= split).
    pub column_split_x: f32,
    /// Lower bound (inclusive) of the band around the split in which a
    /// fragment's position is considered ambiguous.
    pub ambiguous_low: f32,
    /// Upper bound (exclusive) of the ambiguous band.
    pub ambiguous_high: f32,
    /// Two fragments whose y coordinates differ by at most this much are
    /// on the same logical line.
    pub line_y_tolerance: f32,
    /// Minimum font size for a bold "Amendment N" line to count as an
    /// amendment header.
    pub min_heading_font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            footer_y: 760.0,
            watermark_font_size: 20.0,
            column_split_x: 244.0,
            ambiguous_low: 220.0,
            ambiguous_high: 300.0,
            line_y_tolerance: 2.0,
            min_heading_font_size: 11.0,
        }
    }
}

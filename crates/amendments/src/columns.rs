//! Column classification for two-column table-body lines.

use crate::{LayoutConfig, Line};

/// Result of splitting one line at the column boundary.
///
/// Pure data: the segmenter decides where the joined texts accumulate
/// and turns `ambiguous_xs` into a warning on the current amendment.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSplit {
    /// Space-joined text of fragments left of the split, if any.
    pub left: Option<String>,
    /// Space-joined text of fragments at or right of the split, if any.
    pub right: Option<String>,
    /// Rounded x positions of fragments inside the ambiguous band.
    pub ambiguous_xs: Vec<i32>,
}

/// Partition a line's fragments by the horizontal split threshold.
///
/// Every fragment lands in exactly one column: x strictly below the
/// split goes left, at or above goes right.  Fragments inside the
/// ambiguous band `[low, high)` are additionally reported so borderline
/// splits can be audited downstream without blocking extraction.
pub fn split(line: &Line, cfg: &LayoutConfig) -> ColumnSplit {
    let mut left_parts: Vec<&str> = Vec::new();
    let mut right_parts: Vec<&str> = Vec::new();
    let mut ambiguous_xs: Vec<i32> = Vec::new();

    for frag in &line.fragments {
        if frag.x >= cfg.ambiguous_low && frag.x < cfg.ambiguous_high {
            ambiguous_xs.push(frag.x.round() as i32);
        }
        if frag.x < cfg.column_split_x {
            left_parts.push(&frag.text);
        } else {
            right_parts.push(&frag.text);
        }
    }

    let join = |parts: Vec<&str>| {
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    };

    ColumnSplit {
        left: join(left_parts),
        right: join(right_parts),
        ambiguous_xs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fragment;

    fn make_line(frags: &[(&str, f32)]) -> Line {
        Line {
            page: 1,
            y: 100.0,
            fragments: frags
                .iter()
                .map(|(text, x)| Fragment {
                    text: text.to_string(),
                    x: *x,
                    y: 100.0,
                    page: 1,
                    font_size: 12.0,
                    bold: false,
                })
                .collect(),
        }
    }

    fn cfg() -> LayoutConfig {
        LayoutConfig::default()
    }

    #[test]
    fn splits_left_and_right() {
        let line = make_line(&[("Deleted.", 50.0), ("New text here", 320.0)]);
        let split = split(&line, &cfg());
        assert_eq!(split.left.as_deref(), Some("Deleted."));
        assert_eq!(split.right.as_deref(), Some("New text here"));
        assert!(split.ambiguous_xs.is_empty());
    }

    #[test]
    fn fragment_exactly_at_threshold_goes_right() {
        let line = make_line(&[("boundary", 244.0)]);
        let split = split(&line, &cfg());
        assert!(split.left.is_none());
        assert_eq!(split.right.as_deref(), Some("boundary"));
    }

    #[test]
    fn multiple_fragments_joined_per_column() {
        let line = make_line(&[("The", 50.0), ("original", 90.0), ("replacement", 310.0)]);
        let split = split(&line, &cfg());
        assert_eq!(split.left.as_deref(), Some("The original"));
        assert_eq!(split.right.as_deref(), Some("replacement"));
    }

    #[test]
    fn ambiguous_band_is_low_inclusive_high_exclusive() {
        let line = make_line(&[("at_low", 220.0), ("below", 219.9), ("at_high", 300.0)]);
        let split = split(&line, &cfg());
        assert_eq!(split.ambiguous_xs, vec![220]);
    }

    #[test]
    fn ambiguous_fragment_still_lands_in_one_column() {
        // x = 231 is ambiguous but still strictly left of the split.
        let line = make_line(&[("wanders", 231.2)]);
        let split = split(&line, &cfg());
        assert_eq!(split.left.as_deref(), Some("wanders"));
        assert!(split.right.is_none());
        assert_eq!(split.ambiguous_xs, vec![231]);
    }

    #[test]
    fn ambiguous_right_side_reported_too() {
        let line = make_line(&[("a", 245.0), ("b", 290.0)]);
        let split = split(&line, &cfg());
        assert_eq!(split.right.as_deref(), Some("a b"));
        assert_eq!(split.ambiguous_xs, vec![245, 290]);
    }

    #[test]
    fn left_only_line() {
        let line = make_line(&[("original only", 60.0)]);
        let split = split(&line, &cfg());
        assert_eq!(split.left.as_deref(), Some("original only"));
        assert!(split.right.is_none());
    }
}

//! Line assembly: an unordered bag of fragments becomes an ordered
//! sequence of logical lines.

use std::cmp::Ordering;

use crate::{Fragment, LayoutConfig, Line};

/// Group fragments into logical lines ordered by page, then vertical
/// position, then horizontal position.
///
/// One forward pass over the sorted fragments: a new line starts whenever
/// the page changes or the y delta to the previous fragment exceeds the
/// line tolerance.  The tolerance comparison is inclusive, so two
/// baselines exactly the tolerance apart still share a line.
pub fn assemble_lines(mut fragments: Vec<Fragment>, cfg: &LayoutConfig) -> Vec<Line> {
    if fragments.is_empty() {
        return Vec::new();
    }

    fragments.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut iter = fragments.into_iter();
    let first = iter.next().expect("non-empty by guard above");
    let mut current: Vec<Fragment> = vec![first];

    for frag in iter {
        let prev = current.last().expect("current line is never empty");
        let same_page = frag.page == prev.page;
        let close_y = (frag.y - prev.y).abs() <= cfg.line_y_tolerance;

        if same_page && close_y {
            current.push(frag);
        } else {
            lines.push(make_line(std::mem::take(&mut current)));
            current.push(frag);
        }
    }

    if !current.is_empty() {
        lines.push(make_line(current));
    }

    lines
}

/// Build a [`Line`] from fragments known to share a page and baseline.
fn make_line(mut fragments: Vec<Fragment>) -> Line {
    fragments.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    Line {
        page: fragments[0].page,
        y: fragments[0].y,
        fragments,
    }
}

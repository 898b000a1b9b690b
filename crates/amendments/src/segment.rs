//! The amendment segmenter: a state machine over the ordered line stream.
//!
//! Three states. `Preamble` skips front matter and the gaps between
//! amendments.  `Authors` collects the header metadata (author names and
//! the legislative section reference) that follows an "Amendment N"
//! line.  `TableBody` routes every line through the column classifier
//! into the original/amendment accumulators.  A new amendment header is
//! recognized from any state and flushes the previous record; end of
//! input performs one final flush.

use std::sync::OnceLock;

use regex::Regex;

use crate::{columns, Amendment, LayoutConfig, Line, Warning};

/// Structural vocabulary marking a bold header line as a legislative
/// section reference rather than an author name.  Matched by substring,
/// case-sensitive, as these appear verbatim in the documents.
const SECTION_KEYWORDS: &[&str] = &[
    "Motion for a resolution",
    "Paragraph",
    "Recital",
    "Article",
    "Heading",
    "Title",
    "Annex",
    "Proposal",
];

/// A populated column shorter than this is suspicious unless it is the
/// literal token "deleted".
const MIN_PLAUSIBLE_COLUMN_LEN: usize = 3;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Amendment\s+(\d+)$").expect("valid regex"))
}

fn language_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Or\.\s+[a-z]{2}$").expect("valid regex"))
}

/// Document/page codes that live in the footer zone; seeing one inside
/// body text means the footer filter missed a fragment.
fn doc_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)PE\s*\d{3}[.,]\d{3}|AM\\\d+|[A-Z]+-AM-\d").expect("valid regex")
    })
}

/// Column-heading labels that appear alone in the right column and must
/// not be captured as amendment content.
fn column_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(Amendment|Proposal for rejection|Text proposed by the Commission)$")
            .expect("valid regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    Authors,
    TableBody,
}

/// The in-progress amendment plus its accumulators.
#[derive(Debug)]
struct Pending {
    id: String,
    author_lines: Vec<String>,
    section_parts: Vec<String>,
    left_lines: Vec<String>,
    right_lines: Vec<String>,
    warnings: Vec<Warning>,
    has_language_marker: bool,
}

impl Pending {
    fn new(id: String) -> Self {
        Self {
            id,
            author_lines: Vec::new(),
            section_parts: Vec::new(),
            left_lines: Vec::new(),
            right_lines: Vec::new(),
            warnings: Vec::new(),
            has_language_marker: false,
        }
    }

    /// Compute the joined fields, evaluate the flush-time warnings, and
    /// freeze into an output record.
    fn finalize(self) -> Amendment {
        // A trailing comma signals a wrapped author list: continue with a
        // space.  Otherwise distinct entries are separated with "; ".
        let mut authors = String::new();
        for part in &self.author_lines {
            if authors.is_empty() {
                authors.push_str(part);
            } else if authors.ends_with(',') {
                authors.push(' ');
                authors.push_str(part);
            } else {
                authors.push_str("; ");
                authors.push_str(part);
            }
        }

        let section = self.section_parts.join(" / ");
        let content = self.left_lines.join("\n").trim().to_string();
        let amendment = self.right_lines.join("\n").trim().to_string();

        let mut warnings = self.warnings;
        if authors.is_empty() {
            warnings.push(Warning::MissingAuthor);
        }
        if content.is_empty() && amendment.is_empty() {
            warnings.push(Warning::BothColumnsEmpty);
        }
        if column_is_suspicious(&content) {
            warnings.push(Warning::SuspiciouslyShortColumn);
        }
        if column_is_suspicious(&amendment) {
            warnings.push(Warning::SuspiciouslyShortColumn);
        }
        if !self.has_language_marker {
            warnings.push(Warning::NoLanguageMarker);
        }
        if doc_code_re().is_match(&content) || doc_code_re().is_match(&amendment) {
            warnings.push(Warning::FooterTextLeaked);
        }

        Amendment {
            id: self.id,
            authors,
            section,
            content,
            amendment,
            warnings,
        }
    }
}

fn column_is_suspicious(text: &str) -> bool {
    !text.is_empty()
        && text.chars().count() < MIN_PLAUSIBLE_COLUMN_LEN
        && !text.eq_ignore_ascii_case("deleted")
}

/// Segments an ordered line stream into amendment records.
///
/// Feed every assembled line to [`push_line`](Self::push_line) in order,
/// then call [`finish`](Self::finish) to flush the last record and take
/// the output.  Records are emitted in header-encounter order.
pub struct Segmenter<'a> {
    cfg: &'a LayoutConfig,
    state: State,
    current: Option<Pending>,
    prev_id_num: u32,
    out: Vec<Amendment>,
}

impl<'a> Segmenter<'a> {
    pub fn new(cfg: &'a LayoutConfig) -> Self {
        Self {
            cfg,
            state: State::Preamble,
            current: None,
            prev_id_num: 0,
            out: Vec::new(),
        }
    }

    /// Consume one logical line.
    pub fn push_line(&mut self, line: &Line) {
        let text = line.text();
        if text.is_empty() {
            return;
        }

        // An amendment header is recognized from any state.
        if line.is_bold() && line.max_font_size() >= self.cfg.min_heading_font_size {
            if let Some(caps) = header_re().captures(&text) {
                if let Ok(num) = caps[1].parse::<u32>() {
                    self.start_amendment(text, num);
                    self.state = State::Authors;
                    return;
                }
            }
        }

        if self.state == State::Preamble {
            // Front matter and inter-amendment residue are not data.
            return;
        }

        // The language marker closes the current amendment's collection
        // from either remaining state.
        if language_marker_re().is_match(&text) {
            if let Some(cur) = self.current.as_mut() {
                cur.has_language_marker = true;
            }
            self.state = State::Preamble;
            return;
        }

        match self.state {
            State::Authors => self.push_author_state_line(line, &text),
            State::TableBody => self.add_body_line(line),
            State::Preamble => unreachable!("handled above"),
        }
    }

    /// Flush the trailing amendment and return the finished records.
    pub fn finish(mut self) -> Vec<Amendment> {
        self.flush();
        self.out
    }

    // -- internals ----------------------------------------------------------

    fn start_amendment(&mut self, id: String, num: u32) {
        self.flush();
        let mut pending = Pending::new(id);
        if self.prev_id_num != 0 && num != self.prev_id_num + 1 {
            pending.warnings.push(Warning::NonSequentialId {
                expected: self.prev_id_num + 1,
                got: num,
            });
        }
        self.prev_id_num = num;
        self.current = Some(pending);
    }

    fn flush(&mut self) {
        if let Some(pending) = self.current.take() {
            self.out.push(pending.finalize());
        }
    }

    fn push_author_state_line(&mut self, line: &Line, text: &str) {
        let has_right = line
            .fragments
            .iter()
            .any(|f| f.x >= self.cfg.column_split_x);

        if has_right {
            // The two-column table has started.  The transition line is
            // the column-heading row ("Text proposed by the Commission" /
            // "Amendment", or a lone right-column label) and is discarded
            // whole -- unless its right column is real text, in which
            // case the table opened without a heading row and the line is
            // already body content.
            self.state = State::TableBody;
            let heading_row = columns::split(line, self.cfg)
                .right
                .is_some_and(|right| column_label_re().is_match(&right));
            if !heading_row {
                self.add_body_line(line);
            }
            return;
        }

        let Some(cur) = self.current.as_mut() else {
            return;
        };

        if text.to_lowercase().contains("on behalf of") {
            cur.author_lines.push(text.to_string());
            return;
        }

        if line.is_bold() && line.max_font_size() >= self.cfg.min_heading_font_size {
            // Keyword lines are section references.  Once a section has
            // been seen, later bold lines are section continuations --
            // section identifiers wrap across lines.  A genuinely new
            // author line appearing after the section reference would be
            // misclassified here; the rule matches the observed corpus.
            let is_section = SECTION_KEYWORDS.iter().any(|kw| text.contains(kw));
            if is_section || !cur.section_parts.is_empty() {
                cur.section_parts.push(text.to_string());
            } else {
                cur.author_lines.push(text.to_string());
            }
        }
        // Non-bold lines here are sub-qualifiers of the author/section
        // block and are not separately recorded.
    }

    /// Route a table-body line through the column classifier into the
    /// accumulators, recording boundary ambiguity on the current record.
    fn add_body_line(&mut self, line: &Line) {
        let split = columns::split(line, self.cfg);
        let Some(cur) = self.current.as_mut() else {
            return;
        };

        if !split.ambiguous_xs.is_empty() {
            cur.warnings.push(Warning::AmbiguousColumnSplit {
                count: split.ambiguous_xs.len(),
                xs: split.ambiguous_xs,
            });
        }
        if let Some(left) = split.left {
            cur.left_lines.push(left);
        }
        if let Some(right) = split.right {
            cur.right_lines.push(right);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fragment;

    /// (text, x, bold, font_size) fragments on one row.
    fn line(page: u32, y: f32, frags: &[(&str, f32, bool, f32)]) -> Line {
        Line {
            page,
            y,
            fragments: frags
                .iter()
                .map(|(text, x, bold, size)| Fragment {
                    text: text.to_string(),
                    x: *x,
                    y,
                    page,
                    font_size: *size,
                    bold: *bold,
                })
                .collect(),
        }
    }

    fn header(y: f32, n: u32) -> Line {
        line(1, y, &[(&format!("Amendment {}", n), 71.0, true, 12.0)])
    }

    fn bold(y: f32, text: &str) -> Line {
        line(1, y, &[(text, 71.0, true, 12.0)])
    }

    fn marker(y: f32) -> Line {
        line(1, y, &[("Or. en", 400.0, false, 10.0)])
    }

    fn run(lines: &[Line]) -> Vec<Amendment> {
        let cfg = LayoutConfig::default();
        let mut seg = Segmenter::new(&cfg);
        for l in lines {
            seg.push_line(l);
        }
        seg.finish()
    }

    fn tags(a: &Amendment) -> Vec<&'static str> {
        a.warnings.iter().map(|w| w.tag()).collect()
    }

    #[test]
    fn full_two_amendment_scenario() {
        let out = run(&[
            header(100.0, 7),
            bold(120.0, "Kira Marie Peter-Hansen"),
            bold(140.0, "Paragraph 3"),
            line(
                1,
                180.0,
                &[
                    ("Deleted.", 50.0, false, 10.0),
                    ("New text here", 300.0, false, 10.0),
                ],
            ),
            marker(200.0),
            header(220.0, 8),
            marker(260.0),
        ]);

        assert_eq!(out.len(), 2);
        let a7 = &out[0];
        assert_eq!(a7.id, "Amendment 7");
        assert_eq!(a7.authors, "Kira Marie Peter-Hansen");
        assert_eq!(a7.section, "Paragraph 3");
        assert_eq!(a7.content, "Deleted.");
        assert_eq!(a7.amendment, "New text here");
        assert!(!tags(a7).contains(&"no_language_marker"));
        assert_eq!(out[1].id, "Amendment 8");
    }

    #[test]
    fn non_sequential_header_numbers_flagged_on_new_record() {
        let out = run(&[header(100.0, 5), marker(120.0), header(140.0, 7), marker(160.0)]);
        assert_eq!(out.len(), 2);
        assert!(!tags(&out[0]).contains(&"non_sequential_id"));
        assert!(out[1]
            .warnings
            .iter()
            .any(|w| w.to_string() == "non_sequential_id: expected 6, got 7"));
    }

    #[test]
    fn first_amendment_number_is_never_non_sequential() {
        let out = run(&[header(100.0, 42), marker(120.0)]);
        assert!(!tags(&out[0]).contains(&"non_sequential_id"));
    }

    #[test]
    fn left_only_body_leaves_amendment_empty_without_warning() {
        let out = run(&[
            header(100.0, 1),
            bold(120.0, "Some Author"),
            bold(130.0, "Recital 4"),
            // Right fragment opens the table; the row is a heading pair
            // and is discarded.
            line(
                1,
                140.0,
                &[
                    ("Motion for a resolution", 80.0, true, 10.0),
                    ("Amendment", 320.0, true, 10.0),
                ],
            ),
            line(1, 160.0, &[("Original text stays.", 60.0, false, 10.0)]),
            marker(180.0),
        ]);

        let a = &out[0];
        assert_eq!(a.content, "Original text stays.");
        assert_eq!(a.amendment, "");
        assert!(!tags(a).contains(&"both_columns_empty"));
    }

    #[test]
    fn both_columns_empty_flagged() {
        let out = run(&[header(100.0, 1), bold(120.0, "Some Author"), marker(140.0)]);
        assert!(tags(&out[0]).contains(&"both_columns_empty"));
    }

    #[test]
    fn comma_continuation_joins_authors_with_space() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Axel Voss, Angelika Niebler,"),
            bold(120.0, "Marion Walsmann"),
            marker(140.0),
        ]);
        assert_eq!(
            out[0].authors,
            "Axel Voss, Angelika Niebler, Marion Walsmann"
        );
    }

    #[test]
    fn distinct_author_lines_join_with_semicolon() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Axel Voss"),
            bold(120.0, "Marion Walsmann"),
            marker(140.0),
        ]);
        assert_eq!(out[0].authors, "Axel Voss; Marion Walsmann");
    }

    #[test]
    fn on_behalf_of_is_author_even_when_not_bold() {
        let out = run(&[
            header(100.0, 1),
            line(1, 110.0, &[("on behalf of the EPP Group", 71.0, false, 10.0)]),
            marker(140.0),
        ]);
        assert_eq!(out[0].authors, "on behalf of the EPP Group");
        assert!(!tags(&out[0]).contains(&"missing_author"));
    }

    #[test]
    fn bold_line_after_section_is_section_continuation() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            bold(120.0, "Motion for a resolution"),
            bold(130.0, "Heading 1"),
            marker(150.0),
        ]);
        assert_eq!(out[0].authors, "Jane Writer");
        assert_eq!(out[0].section, "Motion for a resolution / Heading 1");
    }

    #[test]
    fn non_bold_qualifier_lines_are_ignored() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(1, 120.0, &[("Draft opinion", 71.0, false, 10.0)]),
            marker(140.0),
        ]);
        assert_eq!(out[0].authors, "Jane Writer");
        assert_eq!(out[0].section, "");
    }

    #[test]
    fn right_only_column_label_discarded() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(1, 130.0, &[("Amendment", 320.0, false, 10.0)]),
            line(1, 150.0, &[("actual new text", 320.0, false, 10.0)]),
            marker(170.0),
        ]);
        assert_eq!(out[0].amendment, "actual new text");
    }

    #[test]
    fn right_only_non_label_first_line_is_content() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(1, 130.0, &[("starts mid-table", 320.0, false, 10.0)]),
            marker(150.0),
        ]);
        assert_eq!(out[0].amendment, "starts mid-table");
    }

    #[test]
    fn missing_language_marker_flagged() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            header(140.0, 2),
            marker(160.0),
        ]);
        assert!(tags(&out[0]).contains(&"no_language_marker"));
        assert!(!tags(&out[1]).contains(&"no_language_marker"));
    }

    #[test]
    fn language_marker_exits_table_body() {
        let out = run(&[
            header(100.0, 1),
            line(1, 120.0, &[("body", 50.0, false, 10.0), ("text", 320.0, false, 10.0)]),
            marker(140.0),
            // Preamble residue between amendments must be ignored.
            line(1, 150.0, &[("stray note", 60.0, false, 10.0)]),
            header(160.0, 2),
            marker(180.0),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "body");
        assert_eq!(out[1].content, "");
    }

    #[test]
    fn front_matter_before_first_header_ignored() {
        let out = run(&[
            line(1, 50.0, &[("European Parliament", 200.0, true, 14.0)]),
            line(1, 70.0, &[("Committee on Legal Affairs", 200.0, false, 10.0)]),
            header(100.0, 1),
            marker(120.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "");
        assert_eq!(out[0].amendment, "");
    }

    #[test]
    fn non_bold_amendment_text_is_not_a_header() {
        let out = run(&[
            header(100.0, 1),
            line(1, 120.0, &[("body", 50.0, false, 10.0), ("x", 320.0, false, 10.0)]),
            // Body text that merely says "Amendment 2" must not split.
            line(1, 140.0, &[("Amendment 2", 50.0, false, 10.0)]),
            marker(160.0),
        ]);
        assert_eq!(out.len(), 1);
        assert!(out[0].content.contains("Amendment 2"));
    }

    #[test]
    fn small_bold_amendment_line_is_not_a_header() {
        let out = run(&[
            header(100.0, 1),
            line(1, 120.0, &[("b", 50.0, false, 10.0), ("x", 320.0, false, 10.0)]),
            line(1, 140.0, &[("Amendment 2", 50.0, true, 9.0)]),
            marker(160.0),
        ]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn end_of_stream_flushes_last_amendment() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(1, 130.0, &[("left", 50.0, false, 10.0), ("right text", 320.0, false, 10.0)]),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "left");
        assert_eq!(out[0].amendment, "right text");
        assert!(tags(&out[0]).contains(&"no_language_marker"));
    }

    #[test]
    fn suspiciously_short_column_flagged_per_column() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(1, 130.0, &[("ab", 50.0, false, 10.0), ("xy", 320.0, false, 10.0)]),
            marker(150.0),
        ]);
        let count = tags(&out[0])
            .iter()
            .filter(|t| **t == "suspiciously_short_column")
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn deleted_token_is_not_suspicious() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(
                1,
                130.0,
                &[("deleted", 50.0, false, 10.0), ("replacement text", 320.0, false, 10.0)],
            ),
            marker(150.0),
        ]);
        assert!(!tags(&out[0]).contains(&"suspiciously_short_column"));
    }

    #[test]
    fn footer_code_in_body_flagged_as_leak() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(
                1,
                130.0,
                &[("PE 772.272 leaked here", 50.0, false, 10.0), ("right side", 320.0, false, 10.0)],
            ),
            marker(150.0),
        ]);
        assert!(tags(&out[0]).contains(&"footer_text_leaked"));
    }

    #[test]
    fn ambiguous_fragment_records_warning_on_current_amendment() {
        let out = run(&[
            header(100.0, 1),
            bold(110.0, "Jane Writer"),
            line(1, 130.0, &[("near the split", 231.0, false, 10.0), ("right", 320.0, false, 10.0)]),
            marker(150.0),
        ]);
        assert!(out[0]
            .warnings
            .iter()
            .any(|w| w.to_string().starts_with("ambiguous_column_split: 1 fragments")));
    }

    #[test]
    fn header_recognized_from_table_body_and_flushes() {
        let out = run(&[
            header(100.0, 1),
            line(1, 120.0, &[("first body", 50.0, false, 10.0), ("x", 320.0, false, 10.0)]),
            // No language marker: the next header must still flush.
            header(140.0, 2),
            line(1, 160.0, &[("second body", 50.0, false, 10.0), ("y", 320.0, false, 10.0)]),
            marker(180.0),
        ]);
        assert_eq!(out.len(), 2);
        // Monotonic flush: nothing after the second header reaches the first.
        assert_eq!(out[0].content, "first body");
        assert_eq!(out[1].content, "second body");
    }

    #[test]
    fn output_order_matches_header_encounter_order() {
        let out = run(&[
            header(100.0, 3),
            marker(110.0),
            header(120.0, 1),
            marker(130.0),
            header(140.0, 2),
            marker(150.0),
        ]);
        let ids: Vec<&str> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["Amendment 3", "Amendment 1", "Amendment 2"]);
    }
}

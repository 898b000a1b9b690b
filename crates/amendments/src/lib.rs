//! Parse European Parliament committee-amendment PDFs into structured
//! records.
//!
//! The pipeline is a deterministic fold over the document:
//!
//! ```text
//! PDF bytes -> Fragment[] -> Line[] -> (per line) column split
//!           -> state-machine accumulation -> Amendment[]
//! ```
//!
//! Each parse owns its own accumulators; nothing is shared across
//! documents, so independent documents can be parsed concurrently with
//! one call per document.

use thiserror::Error;

use extract::{LopdfBackend, PdfBackend};
use segment::Segmenter;

pub mod clean;
pub mod columns;
pub mod config;
pub mod emit;
pub mod extract;
pub mod lines;
pub mod segment;
pub mod types;

pub use config::LayoutConfig;
pub use emit::JsonStyle;
pub use types::{Amendment, Fragment, Line, Warning};

#[derive(Debug, Error)]
pub enum AmendError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a PDF held in memory into amendment records.
pub fn parse_bytes(bytes: &[u8], cfg: &LayoutConfig) -> Result<Vec<Amendment>, AmendError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    let fragments = extract::extract_all_fragments(&backend, cfg)?;
    let lines = lines::assemble_lines(fragments, cfg);
    segment_lines(&lines, cfg)
}

/// Parse a PDF file on disk into amendment records.
pub fn parse_file(
    path: impl AsRef<std::path::Path>,
    cfg: &LayoutConfig,
) -> Result<Vec<Amendment>, AmendError> {
    let bytes = std::fs::read(path)?;
    parse_bytes(&bytes, cfg)
}

/// Run the segmenter over an already-assembled line stream.
///
/// Exposed separately so callers holding fragments from another source
/// (or tests) can skip PDF extraction.
pub fn segment_lines(lines: &[Line], cfg: &LayoutConfig) -> Result<Vec<Amendment>, AmendError> {
    let mut segmenter = Segmenter::new(cfg);
    for line in lines {
        segmenter.push_line(line);
    }
    Ok(segmenter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32, bold: bool, size: f32) -> Fragment {
        Fragment {
            text: text.to_string(),
            x,
            y,
            page: 1,
            font_size: size,
            bold,
        }
    }

    /// Fragment-stream equivalent of a small two-amendment document,
    /// deliberately shuffled to prove order is recovered by assembly.
    fn sample_fragments() -> Vec<Fragment> {
        vec![
            frag("New text here", 300.0, 180.0, false, 10.0),
            frag("Amendment 7", 71.0, 100.0, true, 12.0),
            frag("Paragraph 3", 71.0, 140.0, true, 12.0),
            frag("Or. en", 400.0, 200.0, false, 10.0),
            frag("Deleted.", 50.0, 180.0, false, 10.0),
            frag("Jane Writer", 71.0, 120.0, true, 12.0),
            frag("Amendment 8", 71.0, 220.0, true, 12.0),
            frag("Or. en", 400.0, 260.0, false, 10.0),
        ]
    }

    #[test]
    fn fragments_to_records_end_to_end() {
        let cfg = LayoutConfig::default();
        let lines = lines::assemble_lines(sample_fragments(), &cfg);
        let out = segment_lines(&lines, &cfg).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "Amendment 7");
        assert_eq!(out[0].authors, "Jane Writer");
        assert_eq!(out[0].section, "Paragraph 3");
        assert_eq!(out[0].content, "Deleted.");
        assert_eq!(out[0].amendment, "New text here");
        assert!(out[0].warnings.is_empty());
        assert_eq!(out[1].id, "Amendment 8");
    }

    #[test]
    fn parsing_twice_is_byte_identical() {
        let cfg = LayoutConfig::default();
        let run = || {
            let lines = lines::assemble_lines(sample_fragments(), &cfg);
            let out = segment_lines(&lines, &cfg).unwrap();
            emit::to_json(&out, JsonStyle::Compact).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn record_count_equals_header_count() {
        let cfg = LayoutConfig::default();
        let lines = lines::assemble_lines(sample_fragments(), &cfg);
        let headers = lines
            .iter()
            .filter(|l| l.text().starts_with("Amendment") && l.is_bold())
            .count();
        let out = segment_lines(&lines, &cfg).unwrap();
        assert_eq!(out.len(), headers);
    }

    #[test]
    fn unreadable_bytes_are_a_fatal_parse_error() {
        let err = parse_bytes(b"not a pdf", &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, AmendError::Parse(_)));
    }
}

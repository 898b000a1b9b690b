//! Fragment extraction: the pipeline's upstream collaborator.
//!
//! Walks each page's content stream with a simplified PDF text-rendering
//! state machine and produces positioned [`Fragment`](crate::Fragment)s
//! in a top-left coordinate space.  Page-furniture policy (footer zone,
//! watermark-sized text) is applied here, before line assembly ever sees
//! the fragments.

pub mod backend;
mod fragments;

pub use backend::{decode_text_simple, LopdfBackend, PdfBackend};
pub use fragments::{extract_all_fragments, extract_page_fragments};

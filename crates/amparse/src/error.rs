#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] amendments::AmendError),
}

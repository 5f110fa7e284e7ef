//! PDF error types

use thiserror::Error;

/// Errors from the document mutation engine
#[derive(Debug, Error)]
pub enum PdfError {
    /// Source bytes could not be parsed as a PDF
    #[error("Parse error: {0}")]
    Parse(String),

    /// Output document could not be serialized
    #[error("Serialize error: {0}")]
    Serialize(String),

    /// Merge was called with no source documents
    #[error("No source documents to merge")]
    NoSources,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PDF operations
pub type PdfResult<T> = std::result::Result<T, PdfError>;

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Parse(err.to_string())
    }
}

//! Document text extraction contract.

use async_trait::async_trait;
use thiserror::Error;

/// Why a document could not be turned into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document type: {file_name}")]
    Unsupported { file_name: String },

    #[error("document could not be parsed: {0}")]
    Corrupt(String),

    #[error("document could not be read: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces plain text from a binary document.
///
/// The result is the concatenation of all page or section text in document
/// order. Extraction may take a while and may fail.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractionError>;
}

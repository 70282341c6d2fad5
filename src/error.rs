//! Error types for the conversion and chunking pipeline.
//!
//! Each layer has its own error enum; [`ServiceError`] is what the pipeline
//! hands to the HTTP layer, which is the only place errors become wire bodies.

use thiserror::Error;

/// The document could not be obtained.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("document at {0} is empty")]
    EmptyDownload(String),

    #[error("uploaded file '{0}' is empty")]
    EmptyUpload(String),

    #[error("failed to stage document: {0}")]
    Io(#[from] std::io::Error),
}

/// The converter could not turn the staged bytes into a document.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("unsupported input document: {0}")]
    UnsupportedInput(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("document is not valid UTF-8 text")]
    Encoding,

    #[error("failed to read staged document: {0}")]
    Io(#[from] std::io::Error),
}

/// Tokenizer load or encode failure.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("failed to load tokenizer '{model}': {reason}")]
    Load { model: String, reason: String },

    #[error("failed to encode text: {0}")]
    Encode(String),
}

/// Failure inside the chunking algorithm.
#[derive(Debug, Error)]
pub enum ChunkingError {
    #[error("tokenizer failed while chunking: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Top-level error surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("tokenizer unavailable: {0}")]
    TokenizerUnavailable(TokenizerError),

    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the caller sent a request we reject before doing any work.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::UnsupportedFormat(_))
    }

    /// Short machine-friendly name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::SourceUnavailable(_) => "source_unavailable",
            ServiceError::UnsupportedFormat(_) => "unsupported_format",
            ServiceError::Conversion(_) => "conversion_error",
            ServiceError::TokenizerUnavailable(_) => "tokenizer_unavailable",
            ServiceError::Chunking(_) => "chunking_error",
            ServiceError::Internal(_) => "internal",
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

//! Document Converter Service Library
//!
//! Converts PDF, markdown and plain-text documents into markdown, JSON or
//! HTML, and splits them into token-bounded chunks for RAG pipelines.

pub mod api;
pub mod chunkers;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod testing;

pub use chunkers::{Chunker, HybridChunker, TokenCounter, TokenizerProvider};
pub use convert::{BuiltinConverter, DocumentConverter, DocumentFetcher, HttpFetcher};
pub use error::ServiceError;
pub use pipeline::{Conversion, ConversionPipeline};
pub use types::{Chunk, ChunkConfig, ChunkMetadata, OutputFormat, ServiceConfig, StructuredDocument};

/// Default token budget per chunk
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8000;

/// Default tokenizer, the embedding model the chunks are sized for
pub const DEFAULT_TOKENIZER_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Maximum upload size (100MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

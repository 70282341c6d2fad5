//! Token-aware chunking of structured documents.

mod base;
mod hybrid_chunker;
mod provider;

pub use base::{load_counter, Chunker, HuggingFaceCounter, TiktokenCounter, TokenCounter};
pub use hybrid_chunker::HybridChunker;
pub use provider::TokenizerProvider;

//! Core types for the conversion service.

mod api;
mod chunk;
mod config;
mod document;
mod format;

pub use api::{
    ChunkObject, ChunkRequest, ChunkResponse, ConvertMetadata, ConvertResponse,
    ConvertUrlRequest, EndpointMap, HealthResponse, ServiceInfo,
};
pub use chunk::{Chunk, ChunkMetadata, DocItemRef};
pub use config::{ChunkConfig, LogFormat, ServiceConfig};
pub use document::{Block, BlockKind, DocumentOrigin, StructuredDocument};
pub use format::OutputFormat;

//! Mapping of pipeline results onto the wire schema.

use crate::pipeline::Conversion;
use crate::types::{Chunk, ChunkObject, ChunkResponse, ConvertMetadata, ConvertResponse};

/// Where a converted document came from, as reported in the response.
#[derive(Debug, Clone)]
pub enum ResponseSource {
    Url(String),
    Upload(String),
}

/// Successful conversion response.
pub fn conversion_response(conversion: Conversion, source: ResponseSource) -> ConvertResponse {
    let (source, filename) = match source {
        ResponseSource::Url(url) => (Some(url), None),
        ResponseSource::Upload(filename) => (None, Some(filename)),
    };

    ConvertResponse {
        success: true,
        content: Some(conversion.content),
        error: None,
        metadata: Some(ConvertMetadata {
            num_pages: conversion.num_pages,
            source,
            filename,
            format: conversion.format.as_str().to_string(),
        }),
    }
}

/// Logically failed conversion.
pub fn conversion_failure(error: impl ToString) -> ConvertResponse {
    ConvertResponse {
        success: false,
        content: None,
        error: Some(error.to_string()),
        metadata: None,
    }
}

/// Successful chunk response; totals are derived from the chunks.
pub fn chunk_response(chunks: Vec<Chunk>) -> ChunkResponse {
    let total_tokens = chunks.iter().map(|c| c.token_count).sum();
    let chunks: Vec<ChunkObject> = chunks.into_iter().map(chunk_object).collect();

    ChunkResponse {
        success: true,
        total_chunks: Some(chunks.len()),
        total_tokens: Some(total_tokens),
        chunks: Some(chunks),
        error: None,
    }
}

/// Logically failed chunk request.
pub fn chunk_failure(error: impl ToString) -> ChunkResponse {
    ChunkResponse {
        success: false,
        chunks: None,
        total_chunks: None,
        total_tokens: None,
        error: Some(error.to_string()),
    }
}

fn chunk_object(chunk: Chunk) -> ChunkObject {
    ChunkObject {
        content: chunk.content,
        chunk: chunk.index,
        chunk_size: chunk.char_length,
        tokens: chunk.token_count,
        metadata: chunk.metadata,
    }
}

//! Request and response definitions for the HTTP surface.

use serde::{Deserialize, Serialize};

use super::ChunkMetadata;
use crate::DEFAULT_MAX_TOKENS;

fn default_output_format() -> String {
    "markdown".to_string()
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_merge_peers() -> bool {
    true
}

/// Request to convert a document fetched from a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertUrlRequest {
    /// Absolute http(s) URL of the document
    pub url: String,

    /// One of "markdown", "json", "html"
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

/// Request to chunk a document fetched from a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRequest {
    pub url: String,

    /// Token budget per chunk, must be positive
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Merge adjacent chunks that share a heading lineage
    #[serde(default = "default_merge_peers")]
    pub merge_peers: bool,
}

/// Document-level facts attached to a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertMetadata {
    pub num_pages: Option<usize>,

    /// Source URL (URL conversions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Uploaded filename (file conversions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    pub format: String,
}

/// Response for both conversion endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub content: Option<String>,
    pub error: Option<String>,
    pub metadata: Option<ConvertMetadata>,
}

/// One chunk on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkObject {
    pub content: String,

    /// Chunk index
    pub chunk: usize,

    /// Content length in characters
    pub chunk_size: usize,

    /// Token count of the content
    pub tokens: usize,

    pub metadata: ChunkMetadata,
}

/// Response for the chunk endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResponse {
    pub success: bool,
    pub chunks: Option<Vec<ChunkObject>>,
    pub total_chunks: Option<usize>,
    pub total_tokens: Option<usize>,
    pub error: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Paths of the public endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMap {
    pub convert_url: String,
    pub convert_file: String,
    pub chunk: String,
    pub health: String,
}

/// Service descriptor returned by `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
    pub version: String,
    pub endpoints: EndpointMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_request_defaults() {
        let request: ChunkRequest =
            serde_json::from_str(r#"{"url": "https://example.com/a.pdf"}"#).unwrap();
        assert_eq!(request.max_tokens, 512);
        assert!(request.merge_peers);
    }

    #[test]
    fn test_convert_request_default_format() {
        let request: ConvertUrlRequest =
            serde_json::from_str(r#"{"url": "https://example.com/a.pdf"}"#).unwrap();
        assert_eq!(request.output_format, "markdown");
    }

    #[test]
    fn test_negative_max_tokens_rejected() {
        let result: Result<ChunkRequest, _> =
            serde_json::from_str(r#"{"url": "https://example.com/a.pdf", "max_tokens": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_response_serializes_nulls() {
        let response = ConvertResponse {
            success: false,
            content: None,
            error: Some("boom".to_string()),
            metadata: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "content": null,
                "error": "boom",
                "metadata": null
            })
        );
    }
}

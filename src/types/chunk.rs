//! Chunk type definitions.

use serde::{Deserialize, Serialize};

use super::DocumentOrigin;

/// A chunk of document content bounded by a token budget.
///
/// `char_length` and `token_count` always describe the final `content`,
/// never a pre-merge sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The text of one or more blocks joined by newlines
    pub content: String,

    /// Position in the output sequence (0-indexed, dense)
    pub index: usize,

    /// Length of `content` in characters
    pub char_length: usize,

    /// Number of tokens `content` encodes to
    pub token_count: usize,

    /// Structural lineage and provenance
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk, deriving `char_length` from the content.
    pub fn new(content: String, index: usize, token_count: usize, metadata: ChunkMetadata) -> Self {
        let char_length = content.chars().count();
        Self {
            content,
            index,
            char_length,
            token_count,
            metadata,
        }
    }
}

/// Reference to a block that contributed to a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocItemRef {
    /// JSON-pointer style reference into the structured export
    #[serde(rename = "ref")]
    pub reference: String,

    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_no: Option<usize>,
}

impl DocItemRef {
    pub fn new(block_index: usize, label: &str, page_no: Option<usize>) -> Self {
        Self {
            reference: format!("#/blocks/{}", block_index),
            label: label.to_string(),
            page_no,
        }
    }
}

/// Metadata associated with a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Heading path of the first constituent block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,

    /// Blocks merged into this chunk, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_items: Vec<DocItemRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<DocumentOrigin>,
}

impl ChunkMetadata {
    /// Create metadata for a document chunk.
    pub fn for_document(headings: Vec<String>, origin: Option<DocumentOrigin>) -> Self {
        Self {
            headings,
            origin,
            ..Default::default()
        }
    }

    pub fn with_items(mut self, doc_items: Vec<DocItemRef>) -> Self {
        self.doc_items = doc_items;
        self
    }
}

//! Structure-aware chunker with token budgets and peer merging.

use std::sync::Arc;

use tracing::debug;

use super::base::{Chunker, TokenCounter};
use crate::error::ChunkingError;
use crate::types::{
    Block, Chunk, ChunkConfig, ChunkMetadata, DocItemRef, DocumentOrigin, StructuredDocument,
};

/// Joins the text of merged blocks.
const DELIMITER: &str = "\n";

/// Hybrid chunker for converted documents.
///
/// Every non-heading block becomes a candidate segment; headings only
/// define lineage. Blocks are never split, so a block larger than the
/// budget is emitted on its own. With `merge_peers`, consecutive segments
/// sharing a lineage are packed greedily, left to right, while the merged
/// text still fits the budget.
pub struct HybridChunker {
    counter: Arc<dyn TokenCounter>,
}

/// A run of one or more blocks with the same lineage.
struct Segment<'a> {
    text: String,
    token_count: usize,
    headings: &'a [String],
    items: Vec<DocItemRef>,
}

impl<'a> Segment<'a> {
    fn is_peer_of(&self, other: &Segment<'_>) -> bool {
        self.headings == other.headings
    }
}

impl HybridChunker {
    /// Create a chunker that measures budgets with `counter`.
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self { counter }
    }

    /// Base segmentation: one segment per content block, in document order.
    fn segment<'a>(&self, document: &'a StructuredDocument) -> Result<Vec<Segment<'a>>, ChunkingError> {
        let mut segments = Vec::new();

        for (index, block) in document.blocks.iter().enumerate() {
            if block.is_heading() || block.text.trim().is_empty() {
                continue;
            }
            segments.push(self.segment_for(index, block)?);
        }

        Ok(segments)
    }

    fn segment_for<'a>(&self, index: usize, block: &'a Block) -> Result<Segment<'a>, ChunkingError> {
        Ok(Segment {
            token_count: self.counter.count_tokens(&block.text)?,
            text: block.text.clone(),
            headings: &block.headings,
            items: vec![DocItemRef::new(index, block.kind.label(), block.page_no)],
        })
    }

    /// Greedy single-pass peer merge.
    ///
    /// The accumulator absorbs the next segment while it is a peer and the
    /// joined text stays within `max_tokens`; otherwise the accumulator is
    /// closed and the next segment starts a new one.
    fn merge_peers<'a>(
        &self,
        segments: Vec<Segment<'a>>,
        max_tokens: usize,
    ) -> Result<Vec<Segment<'a>>, ChunkingError> {
        let mut merged = Vec::with_capacity(segments.len());
        let mut segments = segments.into_iter();

        let Some(mut current) = segments.next() else {
            return Ok(merged);
        };

        for next in segments {
            if current.is_peer_of(&next)
                && current.token_count <= max_tokens
                && next.token_count <= max_tokens
            {
                let candidate = format!("{}{}{}", current.text, DELIMITER, next.text);
                let tokens = self.counter.count_tokens(&candidate)?;

                if tokens <= max_tokens {
                    current.text = candidate;
                    current.token_count = tokens;
                    current.items.extend(next.items);
                    continue;
                }
            }

            merged.push(std::mem::replace(&mut current, next));
        }
        merged.push(current);

        Ok(merged)
    }

    /// Assign indices and recount the final content.
    fn finalize(
        &self,
        segments: Vec<Segment<'_>>,
        origin: &DocumentOrigin,
    ) -> Result<Vec<Chunk>, ChunkingError> {
        segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let token_count = self.counter.count_tokens(&segment.text)?;
                let metadata =
                    ChunkMetadata::for_document(segment.headings.to_vec(), Some(origin.clone()))
                        .with_items(segment.items);
                Ok(Chunk::new(segment.text, index, token_count, metadata))
            })
            .collect()
    }
}

impl Chunker for HybridChunker {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn description(&self) -> &'static str {
        "Structure-aware chunker with token budgets and peer merging"
    }

    fn chunk(
        &self,
        document: &StructuredDocument,
        config: &ChunkConfig,
    ) -> Result<Vec<Chunk>, ChunkingError> {
        let segments = self.segment(document)?;
        let candidates = segments.len();

        let oversize = segments
            .iter()
            .filter(|s| s.token_count > config.max_tokens)
            .count();

        let segments = if config.merge_peers {
            self.merge_peers(segments, config.max_tokens)?
        } else {
            segments
        };

        debug!(
            tokenizer = self.counter.name(),
            candidates,
            oversize,
            chunks = segments.len(),
            max_tokens = config.max_tokens,
            merge_peers = config.merge_peers,
            "Chunked document"
        );

        self.finalize(segments, &document.origin)
    }
}

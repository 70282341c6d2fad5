//! Base traits for chunkers and token counters.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::{ChunkingError, TokenizerError};
use crate::types::{Chunk, ChunkConfig, StructuredDocument};

/// The core trait that all chunkers must implement.
///
/// A chunker walks a structured document and produces ordered chunks
/// suitable for embedding and retrieval.
pub trait Chunker: Send + Sync {
    /// Get the name of this chunker.
    fn name(&self) -> &'static str;

    /// Chunk the given document with the provided configuration.
    ///
    /// # Arguments
    /// * `document` - The converted document to chunk
    /// * `config` - Token budget and merge policy
    ///
    /// # Returns
    /// Chunks in document order, indexed from zero.
    fn chunk(
        &self,
        document: &StructuredDocument,
        config: &ChunkConfig,
    ) -> Result<Vec<Chunk>, ChunkingError>;

    /// Get the description of this chunker.
    fn description(&self) -> &'static str {
        "A document chunker"
    }
}

/// Token counter trait for counting tokens in text.
///
/// Implementations must be deterministic: the same text always encodes to
/// the same ids.
pub trait TokenCounter: Send + Sync {
    /// Name of the underlying model or encoding.
    fn name(&self) -> &str;

    /// Encode text into token IDs, without special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError>;

    /// Count the number of tokens in the given text.
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.encode(text)?.len())
    }
}

/// Tiktoken encodings that can be selected by name.
const TIKTOKEN_ENCODINGS: &[&str] = &["cl100k_base", "p50k_base", "p50k_edit", "r50k_base"];

/// Token counter backed by a tiktoken BPE encoding.
pub struct TiktokenCounter {
    encoding: String,
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenCounter {
    /// Create a token counter with a specific encoding.
    pub fn with_encoding(encoding_name: &str) -> Result<Self, TokenizerError> {
        let bpe = match encoding_name {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(TokenizerError::Load {
                    model: other.to_string(),
                    reason: "unknown tiktoken encoding".to_string(),
                })
            }
        }
        .map_err(|e| TokenizerError::Load {
            model: encoding_name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            encoding: encoding_name.to_string(),
            bpe,
        })
    }
}

impl TokenCounter for TiktokenCounter {
    fn name(&self) -> &str {
        &self.encoding
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(self
            .bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|id| id as u32)
            .collect())
    }

    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.bpe.encode_ordinary(text).len())
    }
}

/// Token counter backed by a HuggingFace `tokenizer.json`.
pub struct HuggingFaceCounter {
    model: String,
    tokenizer: tokenizers::Tokenizer,
}

impl HuggingFaceCounter {
    /// Load a tokenizer from a local `tokenizer.json` file.
    pub fn from_file(model: &str, path: &Path) -> Result<Self, TokenizerError> {
        let load_error = |reason: String| TokenizerError::Load {
            model: model.to_string(),
            reason,
        };

        let mut tokenizer =
            tokenizers::Tokenizer::from_file(path).map_err(|e| load_error(e.to_string()))?;

        // Sentence-transformer tokenizers ship with truncation enabled, which
        // would cap every count at the model's sequence length.
        tokenizer
            .with_truncation(None)
            .map_err(|e| load_error(e.to_string()))?;
        tokenizer.with_padding(None);

        Ok(Self {
            model: model.to_string(),
            tokenizer,
        })
    }

    /// Download (or reuse the cached) `tokenizer.json` for a hub model.
    pub fn from_pretrained(model_id: &str) -> Result<Self, TokenizerError> {
        let load_error = |reason: String| TokenizerError::Load {
            model: model_id.to_string(),
            reason,
        };

        info!(model = model_id, "Fetching tokenizer from HuggingFace Hub");
        let api = hf_hub::api::sync::Api::new().map_err(|e| load_error(e.to_string()))?;
        let path = api
            .model(model_id.to_string())
            .get("tokenizer.json")
            .map_err(|e| load_error(e.to_string()))?;

        Self::from_file(model_id, &path)
    }
}

impl TokenCounter for HuggingFaceCounter {
    fn name(&self) -> &str {
        &self.model
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }
}

/// Load the token counter named by `model`.
///
/// A tiktoken encoding name selects tiktoken, an existing file path is read
/// as a `tokenizer.json`, anything else is treated as a hub model id.
/// Blocking: may hit the network.
pub fn load_counter(model: &str) -> Result<Arc<dyn TokenCounter>, TokenizerError> {
    let model = model.trim();

    if TIKTOKEN_ENCODINGS.contains(&model) {
        return Ok(Arc::new(TiktokenCounter::with_encoding(model)?));
    }

    let path = Path::new(model);
    if path.is_file() {
        return Ok(Arc::new(HuggingFaceCounter::from_file(model, path)?));
    }

    Ok(Arc::new(HuggingFaceCounter::from_pretrained(model)?))
}

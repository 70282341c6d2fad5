//! Process-wide, lazily loaded tokenizer.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use super::base::{load_counter, TokenCounter};
use crate::error::TokenizerError;

/// Owns the shared token counter.
///
/// The first caller of [`TokenizerProvider::get`] performs the load while
/// concurrent callers wait on it. A failed load leaves the provider empty,
/// so the next request tries again.
pub struct TokenizerProvider {
    model: String,
    counter: OnceCell<Arc<dyn TokenCounter>>,
}

impl TokenizerProvider {
    /// Create a provider that loads `model` on first use.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            counter: OnceCell::new(),
        }
    }

    /// Create a provider around an already constructed counter.
    pub fn preloaded(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            model: counter.name().to_string(),
            counter: OnceCell::new_with(Some(counter)),
        }
    }

    /// Configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a counter has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.counter.initialized()
    }

    /// Get the shared counter, loading it if needed.
    pub async fn get(&self) -> Result<Arc<dyn TokenCounter>, TokenizerError> {
        let counter = self
            .counter
            .get_or_try_init(|| async {
                let model = self.model.clone();
                info!(model = %model, "Loading tokenizer");

                let loaded = tokio::task::spawn_blocking(move || load_counter(&model))
                    .await
                    .map_err(|e| TokenizerError::Load {
                        model: self.model.clone(),
                        reason: e.to_string(),
                    })
                    .and_then(|result| result);

                if let Err(e) = &loaded {
                    error!(error = %e, "Tokenizer load failed");
                }
                loaded
            })
            .await?;

        Ok(Arc::clone(counter))
    }
}

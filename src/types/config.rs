//! Configuration types for the service and for chunk requests.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_TOKENS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, DEFAULT_TOKENIZER_MODEL};

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listening port
    pub port: u16,

    /// Tokenizer used for chunk budgets: a tiktoken encoding name, a local
    /// `tokenizer.json` path, or a HuggingFace hub model id
    pub tokenizer_model: String,

    /// Maximum accepted upload body in bytes
    pub max_upload_bytes: usize,

    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tokenizer_model: DEFAULT_TOKENIZER_MODEL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            tokenizer_model: lookup("TOKENIZER_MODEL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKENIZER_MODEL.to_string()),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_format: match lookup("LOG_FORMAT").as_deref().map(str::trim) {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}

/// Configuration for a single chunk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum tokens per chunk
    pub max_tokens: usize,

    /// Whether adjacent blocks with the same lineage are merged
    pub merge_peers: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            merge_peers: true,
        }
    }
}

impl ChunkConfig {
    /// Create a config with the given token budget.
    pub fn with_max_tokens(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            ..Default::default()
        }
    }

    pub fn with_merge_peers(mut self, merge_peers: bool) -> Self {
        self.merge_peers = merge_peers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8000);
        assert_eq!(config.tokenizer_model, DEFAULT_TOKENIZER_MODEL);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("PORT", "9100"),
            ("TOKENIZER_MODEL", "cl100k_base"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.port, 9100);
        assert_eq!(config.tokenizer_model, "cl100k_base");
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = ServiceConfig::from_lookup(lookup(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_chunk_config_builder() {
        let config = ChunkConfig::with_max_tokens(100).with_merge_peers(false);
        assert_eq!(config.max_tokens, 100);
        assert!(!config.merge_peers);
        assert_eq!(ChunkConfig::default().max_tokens, 512);
    }
}

//! Request pipeline: resolve the source, convert, then export or chunk.

use std::sync::Arc;

use reqwest::Url;
use tracing::info;

use crate::chunkers::{Chunker, HybridChunker, TokenizerProvider};
use crate::convert::{DocumentConverter, DocumentFetcher, StagedDocument};
use crate::error::{ServiceError, SourceError};
use crate::types::{Chunk, ChunkConfig, DocumentOrigin, OutputFormat, StructuredDocument};

/// An exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub content: String,
    pub num_pages: Option<usize>,
    pub format: OutputFormat,
}

/// Runs conversions and chunking for the HTTP layer.
///
/// Holds no per-request state; the tokenizer is the only shared resource.
pub struct ConversionPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    converter: Arc<dyn DocumentConverter>,
    tokenizer: TokenizerProvider,
}

impl ConversionPipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        converter: Arc<dyn DocumentConverter>,
        tokenizer: TokenizerProvider,
    ) -> Self {
        Self {
            fetcher,
            converter,
            tokenizer,
        }
    }

    pub fn tokenizer(&self) -> &TokenizerProvider {
        &self.tokenizer
    }

    /// Fetch a document and export it.
    pub async fn convert_url(
        &self,
        url: &Url,
        format: OutputFormat,
    ) -> Result<Conversion, ServiceError> {
        let fetched = self.fetcher.fetch(url).await?;
        let document = self.load(fetched.origin, fetched.bytes).await?;
        Ok(export(&document, format))
    }

    /// Convert uploaded bytes and export them.
    pub async fn convert_upload(
        &self,
        filename: &str,
        mimetype: Option<String>,
        bytes: Vec<u8>,
        format: OutputFormat,
    ) -> Result<Conversion, ServiceError> {
        if bytes.is_empty() {
            return Err(SourceError::EmptyUpload(filename.to_string()).into());
        }

        let origin = DocumentOrigin {
            filename: filename.to_string(),
            mimetype,
        };
        let document = self.load(origin, bytes).await?;
        Ok(export(&document, format))
    }

    /// Fetch a document, convert it and split it into chunks.
    pub async fn chunk_url(&self, url: &Url, config: ChunkConfig) -> Result<Vec<Chunk>, ServiceError> {
        let fetched = self.fetcher.fetch(url).await?;
        let document = self.load(fetched.origin, fetched.bytes).await?;

        let counter = self
            .tokenizer
            .get()
            .await
            .map_err(ServiceError::TokenizerUnavailable)?;

        let chunks = tokio::task::spawn_blocking(move || {
            HybridChunker::new(counter).chunk(&document, &config)
        })
        .await??;

        Ok(chunks)
    }

    /// Stage the bytes and run the converter off the async runtime.
    ///
    /// The staged file lives only inside the blocking task.
    async fn load(
        &self,
        origin: DocumentOrigin,
        bytes: Vec<u8>,
    ) -> Result<StructuredDocument, ServiceError> {
        let converter = Arc::clone(&self.converter);

        let document = tokio::task::spawn_blocking(move || -> Result<_, ServiceError> {
            let staged = StagedDocument::stage(origin, &bytes)?;
            drop(bytes);
            Ok(converter.convert(&staged)?)
        })
        .await??;

        info!(
            filename = %document.origin.filename,
            blocks = document.blocks.len(),
            num_pages = ?document.num_pages,
            "Converted document"
        );

        Ok(document)
    }
}

fn export(document: &StructuredDocument, format: OutputFormat) -> Conversion {
    let content = match format {
        OutputFormat::Markdown => document.to_markdown(),
        OutputFormat::Json => document.to_structured_dict().to_string(),
        OutputFormat::Html => document.to_html(),
    };

    Conversion {
        content,
        num_pages: document.num_pages,
        format,
    }
}

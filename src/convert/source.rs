//! Obtaining document bytes and staging them on disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::types::DocumentOrigin;

/// Raw document bytes plus what we know about them.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub origin: DocumentOrigin,
    pub bytes: Vec<u8>,
}

impl FetchedDocument {
    /// Wrap a downloaded body, rejecting empty ones.
    pub fn from_response(
        url: &Url,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<Self, SourceError> {
        if bytes.is_empty() {
            return Err(SourceError::EmptyDownload(url.to_string()));
        }

        Ok(Self {
            origin: DocumentOrigin {
                filename: filename_from_url(url),
                mimetype: content_type.as_deref().and_then(essence),
            },
            bytes,
        })
    }
}

/// Fetches documents by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, SourceError>;
}

/// Fetcher backed by reqwest. No timeout: large documents may take a while.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("doc-converter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, SourceError> {
        let fetch_error = |reason: String| SourceError::Fetch {
            url: url.to_string(),
            reason,
        };

        info!(url = %url, "Fetching document");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("server returned {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        debug!(url = %url, bytes = bytes.len(), "Fetched document");
        FetchedDocument::from_response(url, bytes.to_vec(), content_type)
    }
}

/// Last non-empty path segment of the URL, or `document`.
pub fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(String::from)
        .unwrap_or_else(|| "document".to_string())
}

/// MIME type without parameters, lowercased.
fn essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_lowercase();
    (!essence.is_empty()).then_some(essence)
}

/// Lowercased extension of a filename, if it looks like one.
pub(crate) fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_lowercase())
}

/// A document written to a temporary file for the converter to read.
///
/// The file is removed when this value is dropped, whichever way the
/// request ends. Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct StagedDocument {
    path: PathBuf,
    origin: DocumentOrigin,
}

impl StagedDocument {
    /// Write `bytes` to a fresh temp file carrying the original extension.
    pub fn stage(origin: DocumentOrigin, bytes: &[u8]) -> Result<Self, SourceError> {
        let suffix = extension(&origin.filename)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("doc-converter-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Staged document");

        Ok(Self { path, origin })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }
}

impl Drop for StagedDocument {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged document"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to delete temporary file"
            ),
        }
    }
}

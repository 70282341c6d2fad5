//! Document conversion: source resolution, parsing and export.

mod export;
mod markdown;
mod pdf;
mod source;

pub use markdown::{parse_markdown, parse_plain_text};
pub use pdf::extract_pdf;
pub use source::{filename_from_url, DocumentFetcher, FetchedDocument, HttpFetcher, StagedDocument};

use tracing::info;

use crate::error::ConversionError;
use crate::types::StructuredDocument;

/// Turns a staged document into a structured document.
///
/// Implementations are blocking and are run off the async runtime.
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, source: &StagedDocument) -> Result<StructuredDocument, ConversionError>;
}

/// Input formats the built-in converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Pdf,
    Markdown,
    PlainText,
}

impl InputFormat {
    /// Detect the format from magic bytes, then extension, then MIME type.
    ///
    /// Unknown inputs that are valid UTF-8 are read as plain text.
    pub fn detect(bytes: &[u8], filename: &str, mimetype: Option<&str>) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            return Some(InputFormat::Pdf);
        }

        match source::extension(filename).as_deref() {
            Some("md" | "markdown") => return Some(InputFormat::Markdown),
            Some("txt" | "text") => return Some(InputFormat::PlainText),
            _ => {}
        }

        match mimetype {
            Some("text/markdown" | "text/x-markdown") => return Some(InputFormat::Markdown),
            Some("text/plain") => return Some(InputFormat::PlainText),
            _ => {}
        }

        std::str::from_utf8(bytes)
            .ok()
            .map(|_| InputFormat::PlainText)
    }
}

/// Converter for PDF, markdown and plain text inputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinConverter;

impl BuiltinConverter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentConverter for BuiltinConverter {
    fn convert(&self, source: &StagedDocument) -> Result<StructuredDocument, ConversionError> {
        let bytes = std::fs::read(source.path())?;
        let origin = source.origin().clone();

        let format = InputFormat::detect(&bytes, &origin.filename, origin.mimetype.as_deref())
            .ok_or_else(|| ConversionError::UnsupportedInput(origin.filename.clone()))?;

        info!(
            filename = %origin.filename,
            format = ?format,
            bytes = bytes.len(),
            "Converting document"
        );

        let document = match format {
            InputFormat::Pdf => {
                let (blocks, num_pages) = extract_pdf(&bytes)?;
                StructuredDocument::new(origin, Some(num_pages), blocks)
            }
            InputFormat::Markdown => {
                let text = String::from_utf8(bytes).map_err(|_| ConversionError::Encoding)?;
                StructuredDocument::new(origin, None, parse_markdown(&text))
            }
            InputFormat::PlainText => {
                let text = String::from_utf8(bytes).map_err(|_| ConversionError::Encoding)?;
                StructuredDocument::new(origin, None, parse_plain_text(&text))
            }
        };

        Ok(document)
    }
}

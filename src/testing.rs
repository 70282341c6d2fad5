//! Deterministic fakes shared by unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;

use crate::chunkers::TokenCounter;
use crate::convert::{DocumentFetcher, FetchedDocument};
use crate::error::{SourceError, TokenizerError};

/// One token per whitespace-separated word.
pub struct WhitespaceCounter;

impl TokenCounter for WhitespaceCounter {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(text
            .split_whitespace()
            .map(|word| word.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32)))
            .collect())
    }
}

/// Counter whose every call fails.
pub struct FailingCounter;

impl TokenCounter for FailingCounter {
    fn name(&self) -> &str {
        "failing"
    }

    fn encode(&self, _text: &str) -> Result<Vec<u32>, TokenizerError> {
        Err(TokenizerError::Encode("tokenizer exploded".to_string()))
    }
}

/// `n` distinct words sharing a prefix.
pub fn words(prefix: &str, n: usize) -> String {
    (0..n)
        .map(|i| format!("{}w{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serves documents from memory keyed by URL.
#[derive(Default)]
pub struct StaticFetcher {
    documents: HashMap<String, (Vec<u8>, Option<String>)>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: impl Into<Vec<u8>>, mimetype: Option<&str>) -> Self {
        self.documents
            .insert(url.to_string(), (bytes.into(), mimetype.map(String::from)));
        self
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, SourceError> {
        let (bytes, mimetype) =
            self.documents
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| SourceError::Fetch {
                    url: url.to_string(),
                    reason: "404 Not Found".to_string(),
                })?;

        FetchedDocument::from_response(url, bytes, mimetype)
    }
}

/// A PDF with one line of Courier text per page.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

//! Structured document produced by the converter.

use serde::{Deserialize, Serialize};

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOrigin {
    /// Original filename, or the last URL path segment
    pub filename: String,

    /// Declared MIME type, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

/// Structural role of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    List { ordered: bool, items: Vec<String> },
    Table { rows: Vec<Vec<String>> },
    Code { language: Option<String> },
}

impl BlockKind {
    /// Label used in chunk metadata.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Heading { .. } => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::List { .. } => "list",
            BlockKind::Table { .. } => "table",
            BlockKind::Code { .. } => "code",
        }
    }
}

/// A unit of document content in reading order.
///
/// `headings` is the lineage: titles of the enclosing headings, outermost
/// first. For a heading block it is the lineage of its parent section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    pub kind: BlockKind,

    /// Plain text payload used for chunking
    pub text: String,

    /// 1-based page number, when the source has pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_no: Option<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>, headings: Vec<String>) -> Self {
        Self {
            kind: BlockKind::Heading { level },
            text: text.into(),
            page_no: None,
            headings,
        }
    }

    pub fn paragraph(text: impl Into<String>, headings: Vec<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            page_no: None,
            headings,
        }
    }

    /// A list block; the text is the items rendered one per line with markers.
    pub fn list(ordered: bool, items: Vec<String>, headings: Vec<String>) -> Self {
        let text = items
            .iter()
            .enumerate()
            .map(|(i, item)| list_marker(ordered, i) + item)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            kind: BlockKind::List { ordered, items },
            text,
            page_no: None,
            headings,
        }
    }

    /// A table block; the text is one pipe-separated line per row.
    pub fn table(rows: Vec<Vec<String>>, headings: Vec<String>) -> Self {
        let text = rows
            .iter()
            .map(|row| row.join(" | "))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            kind: BlockKind::Table { rows },
            text,
            page_no: None,
            headings,
        }
    }

    pub fn code(language: Option<String>, text: impl Into<String>, headings: Vec<String>) -> Self {
        Self {
            kind: BlockKind::Code { language },
            text: text.into(),
            page_no: None,
            headings,
        }
    }

    pub fn on_page(mut self, page_no: usize) -> Self {
        self.page_no = Some(page_no);
        self
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading { .. })
    }
}

/// Marker prefix for the `index`-th item of a list.
fn list_marker(ordered: bool, index: usize) -> String {
    if ordered {
        format!("{}. ", index + 1)
    } else {
        "- ".to_string()
    }
}

/// Converter output: ordered blocks plus document-level facts.
///
/// Request-scoped; never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Document name (filename without extension)
    pub name: String,

    pub origin: DocumentOrigin,

    /// Page count when the source format is paginated
    pub num_pages: Option<usize>,

    pub blocks: Vec<Block>,
}

impl StructuredDocument {
    pub fn new(origin: DocumentOrigin, num_pages: Option<usize>, blocks: Vec<Block>) -> Self {
        let name = origin
            .filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(origin.filename.as_str())
            .to_string();
        Self {
            name,
            origin,
            num_pages,
            blocks,
        }
    }
}

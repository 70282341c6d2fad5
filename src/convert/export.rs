//! Export of structured documents to markdown, JSON and HTML.
//!
//! All exports are pure functions of the document.

use crate::types::{Block, BlockKind, StructuredDocument};

impl StructuredDocument {
    /// Render the document as markdown, blocks separated by a blank line.
    pub fn to_markdown(&self) -> String {
        self.blocks
            .iter()
            .map(block_to_markdown)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The document as a nested JSON value.
    pub fn to_structured_dict(&self) -> serde_json::Value {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Render the document as a standalone HTML page.
    pub fn to_html(&self) -> String {
        let body = self
            .blocks
            .iter()
            .map(block_to_html)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(&self.name),
            body
        )
    }
}

fn block_to_markdown(block: &Block) -> String {
    match &block.kind {
        BlockKind::Heading { level } => {
            format!("{} {}", "#".repeat(*level as usize), block.text)
        }
        BlockKind::Paragraph => block.text.clone(),
        BlockKind::List { .. } => block.text.clone(),
        BlockKind::Table { rows } => table_to_markdown(rows),
        BlockKind::Code { language } => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or(""),
            block.text
        ),
    }
}

fn table_to_markdown(rows: &[Vec<String>]) -> String {
    let Some(header) = rows.first() else {
        return String::new();
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!(
        "|{}|",
        header.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in &rows[1..] {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    lines.join("\n")
}

fn block_to_html(block: &Block) -> String {
    match &block.kind {
        BlockKind::Heading { level } => {
            let level = (*level).clamp(1, 6);
            format!("<h{0}>{1}</h{0}>", level, escape_html(&block.text))
        }
        BlockKind::Paragraph => format!("<p>{}</p>", escape_html(&block.text)),
        BlockKind::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let items = items
                .iter()
                .map(|item| format!("<li>{}</li>", escape_html(item)))
                .collect::<String>();
            format!("<{0}>{1}</{0}>", tag, items)
        }
        BlockKind::Table { rows } => {
            let rows = rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let cell = if i == 0 { "th" } else { "td" };
                    let cells = row
                        .iter()
                        .map(|c| format!("<{0}>{1}</{0}>", cell, escape_html(c)))
                        .collect::<String>();
                    format!("<tr>{}</tr>", cells)
                })
                .collect::<String>();
            format!("<table>{}</table>", rows)
        }
        BlockKind::Code { language } => {
            let class = language
                .as_deref()
                .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
                .unwrap_or_default();
            format!("<pre><code{}>{}</code></pre>", class, escape_html(&block.text))
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

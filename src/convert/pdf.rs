//! PDF text extraction.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::markdown::{paragraph_lines, HeadingStack};
use crate::error::ConversionError;
use crate::types::Block;

/// Longest line, in words, still treated as a section title.
const MAX_TITLE_WORDS: usize = 8;

lazy_static! {
    /// Numbered section titles such as "2 Methods" or "3.1 Results".
    static ref SECTION_TITLE: Regex =
        Regex::new(r"^(\d{1,2}(?:\.\d{1,2}){0,4})\.?\s+([A-Z][^.!?]{0,79})$").unwrap();
}

/// Extract blocks and the page count from PDF bytes.
///
/// Every block carries the 1-based number of the page it was read from.
pub fn extract_pdf(bytes: &[u8]) -> Result<(Vec<Block>, usize), ConversionError> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| ConversionError::Pdf(e.to_string()))?;
    let num_pages = document.get_pages().len();

    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ConversionError::Pdf(e.to_string()))?;

    if pages.len() != num_pages {
        warn!(
            num_pages,
            extracted = pages.len(),
            "Extracted page count differs from the page tree"
        );
    }
    debug!(
        num_pages,
        chars = pages.iter().map(String::len).sum::<usize>(),
        "Extracted PDF text"
    );

    let mut headings = HeadingStack::default();
    let mut blocks = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        push_page(&mut blocks, &mut headings, page, i + 1);
    }

    Ok((blocks, num_pages))
}

fn push_page(blocks: &mut Vec<Block>, headings: &mut HeadingStack, text: &str, page_no: usize) {
    for lines in paragraph_lines(text) {
        let block = match section_title(&lines) {
            Some((level, title)) => {
                let parent = headings.enter(level, &title);
                Block::heading(level, title, parent)
            }
            None => Block::paragraph(lines.join(" "), headings.path()),
        };
        blocks.push(block.on_page(page_no));
    }
}

/// Level and title of a numbered section line; level is the numbering depth.
///
/// Only a paragraph made of a single short line qualifies, and every word of
/// four or more letters after the number must be capitalized.
fn section_title(lines: &[&str]) -> Option<(u8, String)> {
    let [line] = lines else {
        return None;
    };
    let caps = SECTION_TITLE.captures(line)?;
    let number = caps.get(1)?.as_str();
    let title = caps.get(2)?.as_str();

    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() > MAX_TITLE_WORDS {
        return None;
    }
    let title_case = words.iter().all(|word| {
        word.chars().count() < 4 || word.chars().next().is_some_and(|c| !c.is_lowercase())
    });
    if !title_case {
        return None;
    }

    let level = number.split('.').count().min(6) as u8;
    Some((level, line.trim().to_string()))
}

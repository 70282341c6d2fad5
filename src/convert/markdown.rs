//! Markdown and plain text to blocks.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::types::Block;

/// Tracks the enclosing headings while walking a document.
#[derive(Debug, Default)]
pub(crate) struct HeadingStack {
    entries: Vec<(u8, String)>,
}

impl HeadingStack {
    /// Current lineage, outermost first.
    pub fn path(&self) -> Vec<String> {
        self.entries.iter().map(|(_, title)| title.clone()).collect()
    }

    /// Enter a heading; returns the lineage of its parent section.
    pub fn enter(&mut self, level: u8, title: &str) -> Vec<String> {
        while self.entries.last().is_some_and(|(l, _)| *l >= level) {
            self.entries.pop();
        }
        let parent = self.path();
        self.entries.push((level, title.to_string()));
        parent
    }
}

/// Open list: items collected so far. Nested lists flatten into the outermost.
struct ListState {
    ordered: bool,
    items: Vec<String>,
    depth: usize,
}

/// Open table: finished rows plus the row being read.
#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
}

/// Builds blocks from a pulldown-cmark event stream.
struct BlockWalker {
    blocks: Vec<Block>,
    headings: HeadingStack,
    text: String,
    heading: Option<u8>,
    list: Option<ListState>,
    table: Option<TableState>,
    code: Option<Option<String>>,
}

impl BlockWalker {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            headings: HeadingStack::default(),
            text: String::new(),
            heading: None,
            list: None,
            table: None,
            code: None,
        }
    }

    fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        text.trim().to_string()
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.text.clear();
                self.heading = Some(level as u8);
            }
            Tag::Paragraph => {
                // Loose list items hold several paragraphs.
                if self.list.is_some() && !self.text.is_empty() {
                    self.text.push(' ');
                } else if self.list.is_none() {
                    self.text.clear();
                }
            }
            Tag::List(start) => match &mut self.list {
                Some(list) => {
                    let parent = self.text.trim().to_string();
                    self.text.clear();
                    if !parent.is_empty() {
                        list.items.push(parent);
                    }
                    list.depth += 1;
                }
                None => {
                    self.text.clear();
                    self.list = Some(ListState {
                        ordered: start.is_some(),
                        items: Vec::new(),
                        depth: 1,
                    });
                }
            },
            Tag::Table(_) => self.table = Some(TableState::default()),
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.row.clear();
                }
            }
            Tag::TableCell => self.text.clear(),
            Tag::CodeBlock(kind) => {
                self.text.clear();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|lang| !lang.is_empty())
                        .map(String::from),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(language);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                let title = self.take_text();
                if let Some(level) = self.heading.take() {
                    if !title.is_empty() {
                        let parent = self.headings.enter(level, &title);
                        self.blocks.push(Block::heading(level, title, parent));
                    }
                }
            }
            TagEnd::Paragraph if self.list.is_none() && self.table.is_none() => {
                let text = self.take_text();
                if !text.is_empty() {
                    self.blocks.push(Block::paragraph(text, self.headings.path()));
                }
            }
            TagEnd::Item => {
                let item = self.take_text();
                if let Some(list) = &mut self.list {
                    if !item.is_empty() {
                        list.items.push(item);
                    }
                }
            }
            TagEnd::List(_) => {
                let nested = self.list.as_ref().is_some_and(|list| list.depth > 1);
                if nested {
                    if let Some(list) = &mut self.list {
                        list.depth -= 1;
                    }
                } else if let Some(list) = self.list.take() {
                    if !list.items.is_empty() {
                        self.blocks
                            .push(Block::list(list.ordered, list.items, self.headings.path()));
                    }
                }
            }
            TagEnd::TableCell => {
                let cell = self.take_text();
                if let Some(table) = &mut self.table {
                    table.row.push(cell);
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    if !table.rows.is_empty() {
                        self.blocks.push(Block::table(table.rows, self.headings.path()));
                    }
                }
            }
            TagEnd::CodeBlock => {
                let text = std::mem::take(&mut self.text);
                let text = text.trim_end_matches('\n');
                if let Some(language) = self.code.take() {
                    if !text.trim().is_empty() {
                        self.blocks
                            .push(Block::code(language, text, self.headings.path()));
                    }
                }
            }
            _ => {}
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => self.text.push_str(&text),
            Event::SoftBreak | Event::HardBreak => {
                if self.code.is_some() {
                    self.text.push('\n');
                } else {
                    self.text.push(' ');
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Vec<Block> {
        self.blocks
    }
}

/// Parse CommonMark (with pipe tables) into blocks with heading lineage.
///
/// Block quotes contribute their paragraphs; thematic breaks and raw HTML
/// are dropped.
pub fn parse_markdown(content: &str) -> Vec<Block> {
    let mut walker = BlockWalker::new();
    for event in Parser::new_ext(content, Options::ENABLE_TABLES) {
        walker.event(event);
    }
    walker.finish()
}

/// Parse plain text: paragraphs separated by blank lines, no structure.
pub fn parse_plain_text(content: &str) -> Vec<Block> {
    split_paragraphs(content)
        .into_iter()
        .map(|text| Block::paragraph(text, Vec::new()))
        .collect()
}

/// Blank-line separated paragraphs with inner line breaks collapsed.
pub(crate) fn split_paragraphs(content: &str) -> Vec<String> {
    paragraph_lines(content)
        .into_iter()
        .map(|lines| lines.join(" "))
        .collect()
}

/// Blank-line separated paragraphs as their trimmed, non-empty lines.
pub(crate) fn paragraph_lines(content: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

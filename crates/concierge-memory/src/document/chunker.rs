//! Line-oriented chunking that tags every body line with its section headings.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{Chunk, Document};

pub const DEFAULT_HEADING: &str = "General Information";
pub const DEFAULT_SUBHEADING: &str = "Miscellaneous";

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## (.+)").expect("heading regex is valid"));

static SUBHEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^### (.+)").expect("subheading regex is valid"));

/// Streaming, single-pass segmenter.
///
/// Heading state carries over between documents fed to the same chunker, and ids
/// keep increasing, so one chunker should be used per ingestion run.
#[derive(Debug, Clone)]
pub struct HeadingChunker {
    heading: String,
    subheading: String,
    next_id: u64,
}

impl Default for HeadingChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingChunker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heading: DEFAULT_HEADING.to_owned(),
            subheading: DEFAULT_SUBHEADING.to_owned(),
            next_id: 0,
        }
    }

    /// A fresh chunker whose first chunk gets `id`.
    #[must_use]
    pub fn starting_at(id: u64) -> Self {
        Self {
            next_id: id,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    #[must_use]
    pub fn subheading(&self) -> &str {
        &self.subheading
    }

    /// Consume one line. Marker lines and blank lines update state only.
    pub fn push_line(&mut self, line: &str) -> Option<Chunk> {
        if HEADING_REGEX.is_match(line) {
            line.trim().clone_into(&mut self.heading);
            DEFAULT_SUBHEADING.clone_into(&mut self.subheading);
            return None;
        }
        if SUBHEADING_REGEX.is_match(line) {
            line.trim().clone_into(&mut self.subheading);
            return None;
        }

        let body = line.trim();
        if body.is_empty() {
            return None;
        }

        let chunk = Chunk {
            id: self.next_id,
            heading: self.heading.clone(),
            subheading: self.subheading.clone(),
            text: format!("{}\n{}\n{body}", self.heading, self.subheading),
        };
        self.next_id += 1;
        Some(chunk)
    }

    pub fn chunk_lines<'a, I>(&mut self, lines: I) -> Vec<Chunk>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.push_line(line))
            .collect()
    }

    pub fn chunk_document(&mut self, document: &Document) -> Vec<Chunk> {
        self.chunk_lines(document.content.lines())
    }
}

//! Line splitting and classification
//!
//! Every physical line keeps its index and byte offset so that resume cursors
//! can point back into a later revision of the same file.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::DEFINITION_SECTION;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]$").expect("section header pattern is valid"));

/// One physical line of decoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Zero-based physical line number
    pub index: usize,

    /// Byte offset of the line start within the decoded text
    pub byte_offset: usize,

    /// Line content without its terminator
    pub text: &'a str,
}

impl SourceLine<'_> {
    /// Byte offset just past the line content, before any terminator
    pub fn end_offset(&self) -> usize {
        self.byte_offset + self.text.len()
    }
}

/// What a line means to the parser, decided before any dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only
    Blank,
    /// `[Definition]` in any casing
    DefinitionHeader,
    /// `[name]`, carrying the lower-cased name
    SectionHeader(String),
    /// Anything else, trimmed
    Content(&'a str),
}

impl LineKind<'_> {
    /// Whether the line opens a new block
    pub fn is_header(&self) -> bool {
        matches!(self, Self::DefinitionHeader | Self::SectionHeader(_))
    }

    /// Whether the line opens the named section
    pub fn opens_section(&self, section: &str) -> bool {
        matches!(self, Self::SectionHeader(name) if name == section)
    }
}

/// Split decoded text into physical lines with byte offsets
///
/// Accepts `\n` and `\r\n` terminators; a trailing terminator does not
/// produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (index, chunk) in text.split_inclusive('\n').enumerate() {
        let line = chunk.strip_suffix('\n').unwrap_or(chunk);
        let line = line.strip_suffix('\r').unwrap_or(line);

        lines.push(SourceLine {
            index,
            byte_offset: offset,
            text: line,
        });
        offset += chunk.len();
    }

    lines
}

/// Classify a single line
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    match SECTION_HEADER.captures(trimmed) {
        Some(caps) => {
            let name = caps
                .get(1)
                .map(|m| m.as_str().trim().to_lowercase())
                .unwrap_or_default();

            if name == DEFINITION_SECTION {
                LineKind::DefinitionHeader
            } else {
                LineKind::SectionHeader(name)
            }
        }
        None => LineKind::Content(trimmed),
    }
}

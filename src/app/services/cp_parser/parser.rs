//! Core section stream parser
//!
//! A single line walker drives both modes. A full parse feeds it every line.
//! A resume feeds it the lines before the volatile block with volatile output
//! suppressed, steps over the lines the cursor already consumed, then feeds
//! the remainder with output enabled. Because the walker's state at the block
//! header is rebuilt exactly as a full parse would build it, the resumed tail
//! is classified identically.

use tracing::{debug, info, warn};

use super::cursor::{ParseCursor, ResumeFallback, VolatileMark};
use super::line::{LineKind, SourceLine, classify, split_lines};
use super::schema::SchemaRegistry;
use super::state::ParserState;
use super::stats::{ParseMode, ParseOutput, ParseStats};
use crate::app::models::{ParsedDocument, Record};
use crate::constants::{DEFAULT_VOLATILE_SECTION, FIELD_SEPARATOR};

/// Section-tagged CP file parser with incremental resume
///
/// The parser itself holds no per-file state; cursors are passed in and
/// returned so the caller decides where they live.
#[derive(Debug, Clone)]
pub struct SectionStreamParser {
    volatile_section: String,
}

impl Default for SectionStreamParser {
    fn default() -> Self {
        Self::new(DEFAULT_VOLATILE_SECTION)
    }
}

impl SectionStreamParser {
    /// Create a parser treating `volatile_section` as append-only
    pub fn new(volatile_section: &str) -> Self {
        Self {
            volatile_section: volatile_section.trim().to_lowercase(),
        }
    }

    /// Name of the append-only section
    pub fn volatile_section(&self) -> &str {
        &self.volatile_section
    }

    /// Parse a whole file version from the start
    pub fn parse_full(&self, identity: &str, text: &str) -> ParseOutput {
        let lines = split_lines(text);
        let mut walker = Walker::new(&self.volatile_section, true);

        for line in &lines {
            walker.feed(line);
        }

        let output = walker.finish(identity, lines.len(), 1, ParseMode::Full, None);
        debug!(
            "Full parse of '{}': {} records in {} sections",
            identity,
            output.stats.records_parsed,
            output.document.section_count()
        );
        output
    }

    /// Parse a new revision of a file, emitting only volatile lines appended
    /// since `cursor` was taken
    ///
    /// Falls back to a full parse whenever the revision is not a plain append
    /// to the one the cursor describes; the reason is returned alongside.
    pub fn resume(&self, identity: &str, text: &str, cursor: &ParseCursor) -> ParseOutput {
        let lines = split_lines(text);

        match self.try_resume(identity, &lines, cursor) {
            Ok(output) => {
                debug!(
                    "Resumed '{}' after {} consumed lines: {} new {} records",
                    identity,
                    cursor.consumed(),
                    output.document.section(&self.volatile_section).len(),
                    self.volatile_section
                );
                output
            }
            Err(reason) => {
                info!("Full re-parse of '{}': {}", identity, reason);
                self.full_fallback(identity, &lines, cursor, reason)
            }
        }
    }

    fn try_resume(
        &self,
        identity: &str,
        lines: &[SourceLine<'_>],
        cursor: &ParseCursor,
    ) -> Result<ParseOutput, ResumeFallback> {
        if cursor.identity != identity {
            return Err(ResumeFallback::IdentityMismatch {
                cursor: cursor.identity.clone(),
                requested: identity.to_string(),
            });
        }

        if cursor.volatile_section != self.volatile_section {
            return Err(ResumeFallback::VolatileSectionChanged {
                cursor: cursor.volatile_section.clone(),
                parser: self.volatile_section.clone(),
            });
        }

        let mark = cursor.volatile.ok_or(ResumeFallback::NoVolatileBlock)?;

        if lines.len() < cursor.min_lines_for_resume() {
            return Err(ResumeFallback::Truncated {
                expected: cursor.min_lines_for_resume(),
                actual: lines.len(),
            });
        }

        let header = self.locate_header(lines, mark.ordinal)?;
        if header != mark.line_index {
            debug!(
                "Volatile header for '{}' moved from line {} to {}",
                identity, mark.line_index, header
            );
        }

        let (resume_at, consumed_bytes) = locate_resume_point(lines, header, mark.consumed)?;
        if consumed_bytes != mark.consumed_bytes {
            return Err(ResumeFallback::ConsumedLinesChanged {
                expected: mark.consumed_bytes,
                found: consumed_bytes,
            });
        }

        let mut walker = Walker::new(&self.volatile_section, false);
        for line in &lines[..header] {
            walker.feed(line);
        }

        walker.emit_volatile = true;
        walker.feed(&lines[header]);
        walker.skip_consumed(mark.consumed, consumed_bytes, resume_at - header - 1);

        for line in &lines[resume_at..] {
            walker.feed(line);
        }

        let drifted = cursor.schema.drifted_sections(walker.registry.table());
        if !drifted.is_empty() {
            return Err(ResumeFallback::SchemaChanged { sections: drifted });
        }

        Ok(walker.finish(
            identity,
            lines.len(),
            cursor.revision + 1,
            ParseMode::Incremental,
            None,
        ))
    }

    fn full_fallback(
        &self,
        identity: &str,
        lines: &[SourceLine<'_>],
        cursor: &ParseCursor,
        reason: ResumeFallback,
    ) -> ParseOutput {
        let mut walker = Walker::new(&self.volatile_section, true);
        for line in lines {
            walker.feed(line);
        }

        let revision = if cursor.identity == identity {
            cursor.revision + 1
        } else {
            1
        };

        walker.finish(identity, lines.len(), revision, ParseMode::Full, Some(reason))
    }

    fn locate_header(
        &self,
        lines: &[SourceLine<'_>],
        ordinal: usize,
    ) -> Result<usize, ResumeFallback> {
        lines
            .iter()
            .filter(|line| classify(line.text).opens_section(&self.volatile_section))
            .nth(ordinal)
            .map(|line| line.index)
            .ok_or(ResumeFallback::HeaderMissing { ordinal })
    }
}

/// Index of the first line after `consumed` content lines of the block at
/// `header`, and the byte span of those lines measured from the header start
fn locate_resume_point(
    lines: &[SourceLine<'_>],
    header: usize,
    consumed: usize,
) -> Result<(usize, usize), ResumeFallback> {
    if consumed == 0 {
        return Ok((header + 1, 0));
    }

    let header_offset = lines[header].byte_offset;
    let mut found = 0;
    for line in &lines[header + 1..] {
        match classify(line.text) {
            LineKind::Blank => {}
            kind if kind.is_header() => break,
            _ => {
                found += 1;
                if found == consumed {
                    return Ok((line.index + 1, line.end_offset() - header_offset));
                }
            }
        }
    }

    Err(ResumeFallback::BlockShrunk {
        expected: consumed,
        found,
    })
}

/// Per-pass parse state
struct Walker<'p> {
    volatile_section: &'p str,
    emit_volatile: bool,
    state: ParserState,
    registry: SchemaRegistry,
    document: ParsedDocument,
    stats: ParseStats,
    volatile_headers: usize,
    mark: Option<VolatileMark>,
}

impl<'p> Walker<'p> {
    fn new(volatile_section: &'p str, emit_volatile: bool) -> Self {
        Self {
            volatile_section,
            emit_volatile,
            state: ParserState::Idle,
            registry: SchemaRegistry::new(),
            document: ParsedDocument::new(),
            stats: ParseStats::new(),
            volatile_headers: 0,
            mark: None,
        }
    }

    fn feed(&mut self, line: &SourceLine<'_>) {
        let kind = classify(line.text);

        match &kind {
            LineKind::Blank => self.stats.blank_lines += 1,
            LineKind::DefinitionHeader => self.stats.header_lines += 1,
            LineKind::SectionHeader(name) => {
                self.stats.header_lines += 1;
                if name == self.volatile_section {
                    self.mark = Some(VolatileMark {
                        ordinal: self.volatile_headers,
                        line_index: line.index,
                        byte_offset: line.byte_offset,
                        consumed: 0,
                        consumed_bytes: 0,
                    });
                    self.volatile_headers += 1;
                }
            }
            LineKind::Content(content) => self.content(line, content),
        }

        self.state = self.state.next(&kind);
    }

    fn content(&mut self, line: &SourceLine<'_>, content: &str) {
        let index = line.index;
        let section = match &self.state {
            ParserState::Idle => {
                debug!("Line {}: content before any section header", index + 1);
                self.stats.inert_lines += 1;
                return;
            }
            ParserState::InDefinition => {
                match self.registry.register(content) {
                    Ok(()) => self.stats.definition_lines += 1,
                    Err(e) => {
                        warn!("Line {}: skipping {}", index + 1, e);
                        self.stats.malformed_definitions += 1;
                        self.stats.warnings.push(format!("line {}: {}", index + 1, e));
                    }
                }
                return;
            }
            ParserState::InSection(name) => name.clone(),
        };

        let is_volatile = section == self.volatile_section;
        if is_volatile {
            if let Some(mark) = self.mark.as_mut() {
                mark.consumed += 1;
                mark.consumed_bytes = line.end_offset() - mark.byte_offset;
            }
        }

        let Some(fields) = self.registry.fields(&section) else {
            debug!("Line {}: no definition for section '{}'", index + 1, section);
            self.stats.inert_lines += 1;
            return;
        };

        let value_count = content.split(FIELD_SEPARATOR).count();
        if value_count < fields.len() {
            self.stats.short_rows += 1;
        } else if value_count > fields.len() {
            self.stats.long_rows += 1;
        }

        let record = Record::from_row(fields, content.split(FIELD_SEPARATOR));

        if is_volatile && !self.emit_volatile {
            self.stats.suppressed_records += 1;
            return;
        }

        self.document.push(&section, record);
        self.stats.records_parsed += 1;
    }

    /// Account for volatile lines stepped over by a resume
    fn skip_consumed(&mut self, consumed: usize, consumed_bytes: usize, physical: usize) {
        if let Some(mark) = self.mark.as_mut() {
            mark.consumed = consumed;
            mark.consumed_bytes = consumed_bytes;
        }
        self.stats.resumed_past = physical;
    }

    fn finish(
        self,
        identity: &str,
        total_lines: usize,
        revision: u64,
        mode: ParseMode,
        fallback: Option<ResumeFallback>,
    ) -> ParseOutput {
        let mut stats = self.stats;
        stats.total_lines = total_lines;

        let cursor = ParseCursor {
            identity: identity.to_string(),
            volatile_section: self.volatile_section.to_string(),
            schema: self.registry.into_table(),
            volatile: self.mark,
            total_lines,
            revision,
        };

        ParseOutput {
            document: self.document,
            stats,
            cursor,
            mode,
            fallback,
        }
    }
}

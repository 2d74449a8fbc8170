//! Per-upload ingestion pipeline

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::Result;
use crate::app::models::{DetectedEncoding, ParsedDocument, RawDocument};
use crate::app::services::cp_parser::{ParseMode, ParseStats, ResumeFallback, SectionStreamParser};
use crate::app::services::cursor_cache::CursorCache;
use crate::app::services::encoding::decode_document;

/// Result of ingesting one upload
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    /// File identity the upload was filed under
    pub identity: String,

    /// Encoding used to decode the upload
    pub encoding: DetectedEncoding,

    /// Replacement characters introduced by decoding
    pub replacements: usize,

    /// Full parse or incremental resume
    pub mode: ParseMode,

    /// Why a resume was not possible, when one was attempted
    pub fallback: Option<ResumeFallback>,

    /// Name of the append-only section
    pub volatile_section: String,

    /// Parsed records; volatile records are new ones only when incremental
    pub document: ParsedDocument,

    /// Line accounting
    pub stats: ParseStats,

    /// Volatile records in `document`
    pub new_volatile_records: usize,

    /// Revision count of the identity's cursor after this upload
    pub revision: u64,
}

impl IngestOutcome {
    /// Whether a stored copy of the volatile section should be replaced
    /// rather than appended to
    pub fn replaces_volatile(&self) -> bool {
        self.mode == ParseMode::Full
    }
}

/// Decodes uploads and parses them against the identity's cached cursor
///
/// Cloning is cheap; clones share the cursor cache.
#[derive(Debug, Clone)]
pub struct Ingestor {
    parser: SectionStreamParser,
    cache: Arc<CursorCache>,
}

impl Ingestor {
    /// Create an ingestor over a shared cursor cache
    pub fn new(parser: SectionStreamParser, cache: Arc<CursorCache>) -> Self {
        Self { parser, cache }
    }

    /// Parser used for every upload
    pub fn parser(&self) -> &SectionStreamParser {
        &self.parser
    }

    /// Cursor cache shared by clones of this ingestor
    pub fn cache(&self) -> &Arc<CursorCache> {
        &self.cache
    }

    /// Ingest one upload
    ///
    /// Decoding failures are returned as errors and leave the identity's
    /// cursor untouched. Everything else produces an outcome: a resume when
    /// the cached cursor still applies, otherwise a full parse.
    pub fn ingest(&self, doc: RawDocument) -> Result<IngestOutcome> {
        let start = Instant::now();
        let decoded = decode_document(&doc)?;
        let identity = doc.identity;

        let output = self.cache.with_entry(&identity, |slot| {
            let output = match slot.as_ref() {
                Some(cursor) => self.parser.resume(&identity, &decoded.text, cursor),
                None => {
                    debug!("No cursor for '{}', parsing in full", identity);
                    self.parser.parse_full(&identity, &decoded.text)
                }
            };
            *slot = Some(output.cursor.clone());
            output
        });

        let volatile_section = self.parser.volatile_section().to_string();
        let new_volatile_records = output.document.section(&volatile_section).len();

        info!(
            "Ingested '{}' ({:?}, {}): {} records, {} new {} in {}ms",
            identity,
            output.mode,
            decoded.encoding.name,
            output.stats.records_parsed,
            new_volatile_records,
            volatile_section,
            start.elapsed().as_millis()
        );

        Ok(IngestOutcome {
            identity,
            encoding: decoded.encoding,
            replacements: decoded.replacements,
            mode: output.mode,
            fallback: output.fallback,
            volatile_section,
            document: output.document,
            stats: output.stats,
            new_volatile_records,
            revision: output.cursor.revision,
        })
    }

    /// Read a file from disk and ingest it under its file name
    pub fn ingest_path(&self, path: &Path) -> Result<IngestOutcome> {
        self.ingest(RawDocument::from_path(path)?)
    }
}

//! Parsing statistics and result structures for CP file processing
//!
//! This module provides types for tracking what happened to each line and for
//! packaging parse output for the ingestor.

use serde::{Deserialize, Serialize};

use super::cursor::{ParseCursor, ResumeFallback};
use crate::app::models::ParsedDocument;

/// Whether a parse emitted the whole volatile section or only its new tail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Every section parsed from the start; volatile records are the full history
    Full,
    /// Volatile records are only those appended since the cursor was taken
    Incremental,
}

/// Parse output with statistics and the cursor for the next revision
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// Parsed records by section
    pub document: ParsedDocument,

    /// Line accounting for this pass
    pub stats: ParseStats,

    /// Cursor describing this file version
    pub cursor: ParseCursor,

    /// Full or incremental
    pub mode: ParseMode,

    /// Set when a resume was requested but preconditions failed
    pub fallback: Option<ResumeFallback>,
}

/// Line accounting for one parse pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Physical lines in the file
    pub total_lines: usize,

    /// Empty or whitespace-only lines
    pub blank_lines: usize,

    /// Section and definition headers
    pub header_lines: usize,

    /// Definition lines accepted into the schema
    pub definition_lines: usize,

    /// Definition lines rejected as malformed
    pub malformed_definitions: usize,

    /// Records produced
    pub records_parsed: usize,

    /// Rows with fewer values than fields
    pub short_rows: usize,

    /// Rows with more values than fields
    pub long_rows: usize,

    /// Content lines outside any known schema
    pub inert_lines: usize,

    /// Volatile records from earlier revisions not re-emitted
    pub suppressed_records: usize,

    /// Volatile lines skipped over by a resume
    pub resumed_past: usize,

    /// Problems worth surfacing to an operator
    pub warnings: Vec<String>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every content line was understood
    pub fn is_clean(&self) -> bool {
        self.malformed_definitions == 0 && self.inert_lines == 0
    }
}

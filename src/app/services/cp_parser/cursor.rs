//! Resume cursor for incremental parsing of a growing file

use serde::{Deserialize, Serialize};

use super::schema::SchemaTable;

/// Position of the most recent volatile block in a parsed file version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatileMark {
    /// How many volatile headers precede this one in the file
    pub ordinal: usize,

    /// Physical line index of the block's header
    pub line_index: usize,

    /// Byte offset of the block's header in the decoded text
    pub byte_offset: usize,

    /// Content lines already consumed inside the block
    pub consumed: usize,

    /// Bytes from the header start to the end of the last consumed line
    ///
    /// A later revision must reproduce this length exactly; a line that was
    /// still being written when the file was read will not.
    pub consumed_bytes: usize,
}

/// Saved state that lets a later parse skip already-processed volatile lines
///
/// The schema is kept so a later revision can be checked against it before
/// any resumed record is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseCursor {
    /// File identity this cursor belongs to
    pub identity: String,

    /// Volatile section name the cursor was tracking
    pub volatile_section: String,

    /// Schema table of the parsed file version
    pub schema: SchemaTable,

    /// Most recent volatile block, absent when the file had none
    pub volatile: Option<VolatileMark>,

    /// Physical line count of the parsed file version
    pub total_lines: usize,

    /// Number of parses that have advanced this cursor
    pub revision: u64,
}

impl ParseCursor {
    /// Volatile content lines consumed so far
    pub fn consumed(&self) -> usize {
        self.volatile.map(|mark| mark.consumed).unwrap_or(0)
    }

    /// Minimum line count a grown revision must have for the cursor to apply
    pub fn min_lines_for_resume(&self) -> usize {
        self.volatile
            .map(|mark| mark.line_index + 1 + mark.consumed)
            .unwrap_or(0)
    }
}

/// Why a resume request was answered with a full parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResumeFallback {
    #[error("cursor belongs to '{cursor}', not '{requested}'")]
    IdentityMismatch { cursor: String, requested: String },

    #[error("cursor tracked section '{cursor}', parser tracks '{parser}'")]
    VolatileSectionChanged { cursor: String, parser: String },

    #[error("previous revision had no volatile block")]
    NoVolatileBlock,

    #[error("file has {actual} lines, cursor needs at least {expected}")]
    Truncated { expected: usize, actual: usize },

    #[error("volatile header #{ordinal} is no longer present")]
    HeaderMissing { ordinal: usize },

    #[error("volatile block holds {found} content lines, cursor consumed {expected}")]
    BlockShrunk { expected: usize, found: usize },

    #[error("consumed volatile lines span {found} bytes, cursor recorded {expected}")]
    ConsumedLinesChanged { expected: usize, found: usize },

    #[error("schema changed for sections: {}", sections.join(", "))]
    SchemaChanged { sections: Vec<String> },
}

//! Application constants for the CP file processor
//!
//! This module contains format markers, default values and file patterns
//! used throughout the CP file processor.

// =============================================================================
// CP File Format
// =============================================================================

/// Name of the section whose lines declare every other section's fields
pub const DEFINITION_SECTION: &str = "definition";

/// Separator between a section name and its field list in a definition line
pub const DEFINITION_ASSIGN: char = '=';

/// Separator between fields in definition and data lines
pub const FIELD_SEPARATOR: char = ';';

/// Section that grows by appending between uploads of the same file
pub const DEFAULT_VOLATILE_SECTION: &str = "actions";

/// Well-known snapshot sections produced by the federation exporter
pub mod sections {
    /// Match header: game code, teams, scores per half
    pub const GAME_INFO: &str = "gameinfo";

    /// Per-team statistics rows
    pub const TEAM_STATS: &str = "statteam";
}

// =============================================================================
// Encoding Detection
// =============================================================================

/// Confidence reported when a byte-order mark decides the encoding
pub const CONFIDENCE_BOM: f32 = 1.0;

/// Confidence reported when the buffer validates as UTF-8
pub const CONFIDENCE_UTF8: f32 = 1.0;

/// Confidence reported when an explicit hint decides the encoding
pub const CONFIDENCE_HINT: f32 = 0.9;

/// Confidence reported for a statistical guess
pub const CONFIDENCE_GUESS: f32 = 0.5;

// =============================================================================
// Cursor Cache
// =============================================================================

/// Default idle time after which a cached cursor is evicted (1 hour)
pub const DEFAULT_CURSOR_IDLE_TTL_SECS: u64 = 3600;

/// Default upper bound on cached cursors
pub const DEFAULT_CURSOR_MAX_ENTRIES: usize = 1024;

/// Version tag written into persisted cursor state files
pub const CURSOR_STATE_VERSION: u32 = 2;

// =============================================================================
// Ingestion
// =============================================================================

/// File extensions recognised when walking input directories
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &["cp", "txt"];

/// Default output directory for the JSON sink
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default polling interval for the watch command
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Application directory name under the user config directory
pub const APP_DIR_NAME: &str = "cpfile-processor";

/// Default config file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default cursor state file name inside the application directory
pub const CURSOR_STATE_FILE_NAME: &str = "cursors.json";

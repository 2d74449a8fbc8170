//! CP File Processor Library
//!
//! A Rust library for ingesting handball federation CP statistics export files:
//! semicolon-delimited, section-tagged text files whose `[Definition]` block
//! describes the field layout of every other section.
//!
//! This library provides tools for:
//! - Detecting the text encoding of an upload and decoding it
//! - Building the per-section schema table from `[Definition]` lines
//! - Parsing section data rows into ordered field/value records
//! - Resuming a parse of a grown file by replaying only the appended lines
//!   of the volatile (play-by-play) section
//! - Caching resume cursors per file identity with idle eviction and persistence
//! - Handing parsed documents to a reconciliation collaborator

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod cp_parser;
        pub mod cursor_cache;
        pub mod encoding;
        pub mod ingest;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{ParsedDocument, RawDocument, Record};
pub use app::services::cp_parser::{ParseCursor, SchemaTable, SectionStreamParser};
pub use app::services::cursor_cache::CursorCache;
pub use app::services::ingest::{IngestOutcome, Ingestor};
pub use config::Config;

/// Result type alias for the CP file processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CP file processing operations
///
/// Per-line problems inside a document never surface here; they are counted in
/// the parse statistics and skipped. These variants cover whole-file and
/// infrastructure failures.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded as text under any guessable encoding
    #[error("Decode error in '{identity}': {message}")]
    Decode { identity: String, message: String },

    /// Upload contained no bytes
    #[error("Empty document: {identity}")]
    EmptyDocument { identity: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization or deserialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cursor cache state could not be used
    #[error("Cursor cache error: {message}")]
    CursorCache { message: String },

    /// Reconciliation collaborator rejected an outcome
    #[error("Reconcile error for '{identity}': {message}")]
    Reconcile { identity: String, message: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Invalid glob pattern in an input list
    #[error("Invalid input pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a decode error for one document
    pub fn decode(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// Create an empty document error
    pub fn empty_document(identity: impl Into<String>) -> Self {
        Self::EmptyDocument {
            identity: identity.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a cursor cache error
    pub fn cursor_cache(message: impl Into<String>) -> Self {
        Self::CursorCache {
            message: message.into(),
        }
    }

    /// Create a reconcile error
    pub fn reconcile(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reconcile {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error should stop a whole batch rather than a single file
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::ProcessingInterrupted { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<glob::PatternError> for Error {
    fn from(error: glob::PatternError) -> Self {
        Self::Pattern {
            pattern: "unknown".to_string(),
            message: error.msg.to_string(),
        }
    }
}

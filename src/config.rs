//! Configuration management and validation.
//!
//! Provides configuration structures for the parser, the cursor cache and
//! the ingestion commands, loaded in layers: built-in defaults, then a JSON
//! config file, then command-line overrides applied by the CLI.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, CURSOR_STATE_FILE_NAME, DEFAULT_CURSOR_IDLE_TTL_SECS,
    DEFAULT_CURSOR_MAX_ENTRIES, DEFAULT_FILE_EXTENSIONS, DEFAULT_OUTPUT_DIR,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_VOLATILE_SECTION,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Parser settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Section treated as append-only between uploads of the same file
    pub volatile_section: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            volatile_section: DEFAULT_VOLATILE_SECTION.to_string(),
        }
    }
}

/// Cursor cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cursor may sit unused before eviction
    pub idle_ttl_secs: u64,

    /// Maximum number of identities kept
    pub max_entries: usize,

    /// File the cursors are persisted to between runs
    pub state_file: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: DEFAULT_CURSOR_IDLE_TTL_SECS,
            max_entries: DEFAULT_CURSOR_MAX_ENTRIES,
            state_file: None,
        }
    }
}

/// Batch and watch ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Files ingested concurrently
    pub workers: usize,

    /// Extensions picked up when walking input directories
    pub file_extensions: Vec<String>,

    /// Root directory of the JSON sink
    pub output_path: PathBuf,

    /// Seconds between polls in watch mode
    pub poll_interval_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            file_extensions: DEFAULT_FILE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for the crate's log output
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Global configuration for CP file processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub cache: CacheConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location: `<config dir>/cpfile-processor/config.json`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Load a configuration file; keys it omits keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::configuration(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;

        serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Defaults overlaid with `config_file` when given, otherwise with the
    /// default config file when one exists
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_file {
            debug!("Loading config from {}", path.display());
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Check settings for values the processor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.parser.volatile_section.trim().is_empty() {
            return Err(Error::configuration("Volatile section name cannot be empty"));
        }

        if self.parser.volatile_section.contains(['[', ']']) {
            return Err(Error::configuration(
                "Volatile section name must not include brackets",
            ));
        }

        if self.ingest.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.ingest.poll_interval_secs == 0 {
            return Err(Error::configuration(
                "Poll interval must be at least 1 second",
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(Error::configuration(
                "Cursor cache must allow at least one entry",
            ));
        }

        Ok(())
    }

    /// Set the append-only section
    pub fn with_volatile_section(mut self, section: impl Into<String>) -> Self {
        self.parser.volatile_section = section.into();
        self
    }

    /// Set the number of concurrent ingestion workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.ingest.workers = workers;
        self
    }

    /// Set the sink output directory
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ingest.output_path = path.into();
        self
    }

    /// Persist cursors to the given file
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache.state_file = Some(path.into());
        self
    }

    /// Set the watch poll interval
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.ingest.poll_interval_secs = secs;
        self
    }

    /// Cursor idle TTL as a duration
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.idle_ttl_secs)
    }

    /// Watch poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.ingest.poll_interval_secs)
    }

    /// Cursor state file: the configured one, or `cursors.json` in the output directory
    pub fn state_file_path(&self) -> PathBuf {
        self.cache
            .state_file
            .clone()
            .unwrap_or_else(|| self.ingest.output_path.join(CURSOR_STATE_FILE_NAME))
    }

    /// Whether a path has one of the configured input extensions
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.ingest
                    .file_extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
    }
}

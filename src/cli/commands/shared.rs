//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use crate::app::services::cp_parser::ParseMode;
use crate::app::services::cursor_cache::CursorCache;
use crate::app::services::ingest::{IngestOutcome, ReconcileSummary};
use crate::cli::args::Args;
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Receiver side of the Ctrl-C notification; flips to `true` once
pub type ShutdownSignal = tokio::sync::watch::Receiver<bool>;

/// Ingestion statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Files ingested and reconciled
    pub files_processed: usize,
    /// Files that failed to decode, parse or reconcile
    pub files_failed: usize,
    /// Outcomes that were full parses
    pub full_parses: usize,
    /// Outcomes that were incremental resumes
    pub incremental_parses: usize,
    /// Full parses caused by a failed resume
    pub fallbacks: usize,
    /// Records produced across all sections
    pub records_parsed: usize,
    /// New volatile records handed to the sink
    pub new_volatile_records: usize,
    /// Lines nobody could interpret
    pub inert_lines: usize,
    /// Failure messages by input
    pub failures: Vec<(PathBuf, String)>,
    /// Total processing time
    pub processing_time: Duration,
}

impl IngestStats {
    /// Account for one successfully reconciled outcome
    pub fn record(&mut self, outcome: &IngestOutcome, summary: &ReconcileSummary) {
        self.files_processed += 1;
        match outcome.mode {
            ParseMode::Full => self.full_parses += 1,
            ParseMode::Incremental => self.incremental_parses += 1,
        }
        if outcome.fallback.is_some() {
            self.fallbacks += 1;
        }
        self.records_parsed += outcome.stats.records_parsed;
        self.new_volatile_records += summary.volatile_appended;
        self.inert_lines += outcome.stats.inert_lines;
    }

    /// Account for one failed input
    pub fn record_failure(&mut self, path: &Path, error: &Error) {
        self.files_failed += 1;
        self.failures.push((path.to_path_buf(), error.to_string()));
    }

    /// Print a coloured summary to stdout
    pub fn print_summary(&self) {
        println!("\n{}", "Ingestion Summary".bright_green().bold());
        println!(
            "  {} {}",
            "Time elapsed:".bright_cyan(),
            HumanDuration(self.processing_time).to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            self.files_processed.to_string().bright_white()
        );
        println!(
            "  {} {} full, {} incremental",
            "Parses:".bright_cyan(),
            self.full_parses.to_string().bright_white(),
            self.incremental_parses.to_string().bright_white()
        );
        if self.fallbacks > 0 {
            println!(
                "  {} {}",
                "Resume fallbacks:".bright_yellow(),
                self.fallbacks.to_string().bright_yellow()
            );
        }
        println!(
            "  {} {}",
            "Records parsed:".bright_cyan(),
            self.records_parsed.to_string().bright_white().bold()
        );
        println!(
            "  {} {}",
            "New volatile records:".bright_cyan(),
            self.new_volatile_records.to_string().bright_white().bold()
        );
        if self.inert_lines > 0 {
            println!(
                "  {} {}",
                "Uninterpreted lines:".bright_yellow(),
                self.inert_lines.to_string().bright_yellow()
            );
        }
        if self.files_failed > 0 {
            println!(
                "  {} {}",
                "Files failed:".bright_red(),
                self.files_failed.to_string().bright_red().bold()
            );
            for (path, message) in &self.failures {
                println!("    {} {}", path.display().to_string().red(), message);
            }
        }
    }
}

/// Set up structured logging
pub fn setup_logging(args: &Args, level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cpfile_processor={}", level)));

    let result = if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

/// Load configuration using the layered approach (defaults -> file -> args)
pub fn load_configuration(args: &Args) -> Result<Config> {
    let mut config = Config::load_layered(args.config_file.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Open the cursor cache, restoring persisted cursors when a state file exists
pub fn open_cursor_cache(config: &Config) -> Result<CursorCache> {
    let path = config.state_file_path();
    CursorCache::load(&path, config.idle_ttl(), config.cache.max_entries)
}

/// Persist the cursor cache to the configured state file
pub fn save_cursor_cache(cache: &CursorCache, config: &Config) -> Result<()> {
    let path = config.state_file_path();
    let count = cache.save(&path)?;
    info!("Saved {} cursors to {}", count, path.display());
    Ok(())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expand CLI inputs into a sorted, de-duplicated list of files
///
/// Existing files are taken as given. Directories are walked recursively and
/// filtered by extension. Anything else containing glob metacharacters is
/// expanded as a pattern.
pub fn collect_input_files(inputs: &[String], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(false) {
                let entry = entry?;
                if entry.file_type().is_file() && config.accepts_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if is_glob_pattern(input) {
            let paths =
                glob::glob(input).map_err(|e| Error::pattern(input.as_str(), e.msg))?;
            for entry in paths {
                let entry = entry.map_err(|e| {
                    let message = format!("Failed to read {}", e.path().display());
                    Error::io(message, e.into_error())
                })?;
                if entry.is_file() {
                    files.push(entry);
                }
            }
        } else {
            return Err(Error::file_not_found(input.as_str()));
        }
    }

    files.sort();
    files.dedup();

    debug!("Collected {} input files", files.len());
    Ok(files)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

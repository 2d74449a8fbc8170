//! Watch command: poll one growing file and ingest each new revision

use super::shared::{IngestStats, ShutdownSignal, open_cursor_cache, save_cursor_cache};
use crate::app::services::cp_parser::{ParseMode, SectionStreamParser};
use crate::app::services::ingest::{Ingestor, JsonSink, Reconciler};
use crate::cli::args::WatchArgs;
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tokio::task;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Size and modification time of a file, used to detect new revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileFingerprint {
    /// Read the fingerprint of `path`
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::io(format!("Failed to stat {}", path.display()), e))?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Poll `args.file` until Ctrl-C, ingesting it whenever it changes
pub async fn run_watch(
    args: &WatchArgs,
    config: &Config,
    mut shutdown: ShutdownSignal,
) -> Result<IngestStats> {
    let start = Instant::now();
    if !args.file.exists() {
        return Err(Error::file_not_found(args.file.display().to_string()));
    }

    let cache = Arc::new(open_cursor_cache(config)?);
    let ingestor = Ingestor::new(
        SectionStreamParser::new(&config.parser.volatile_section),
        Arc::clone(&cache),
    );
    let mut sink = JsonSink::new(&config.ingest.output_path)?;

    println!(
        "{} {} every {}s (Ctrl-C to stop)",
        "Watching".bright_green().bold(),
        args.file.display().to_string().bright_white(),
        config.ingest.poll_interval_secs
    );

    let mut interval = time::interval(config.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_seen: Option<FileFingerprint> = None;
    let mut stats = IngestStats::default();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            Ok(()) = shutdown.changed() => {}
        }
        if *shutdown.borrow() {
            info!("Stopping watch of {}", args.file.display());
            break;
        }

        let fingerprint = match FileFingerprint::read(&args.file) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        let evicted = cache.evict_idle();
        if evicted > 0 {
            debug!("Evicted {} idle cursors", evicted);
        }

        if last_seen == Some(fingerprint) {
            continue;
        }

        let path = args.file.clone();
        let worker = ingestor.clone();
        let result = task::spawn_blocking(move || worker.ingest_path(&path))
            .await
            .map_err(|e| Error::io("Ingest task failed", std::io::Error::other(e)))
            .and_then(|result| result);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to ingest {}: {}", args.file.display(), e);
                stats.record_failure(&args.file, &e);
                // Retry on the next change
                last_seen = Some(fingerprint);
                continue;
            }
        };

        match sink.reconcile(&outcome) {
            Ok(summary) => {
                let mode = match outcome.mode {
                    ParseMode::Full => "full".bright_yellow(),
                    ParseMode::Incremental => "incremental".bright_green(),
                };
                println!(
                    "  {} revision {} ({}): {} new {} records",
                    outcome.identity.bright_white(),
                    outcome.revision,
                    mode,
                    summary.volatile_appended.to_string().bright_white().bold(),
                    outcome.volatile_section
                );
                if let Some(reason) = &outcome.fallback {
                    println!("    {} {}", "re-parsed:".bright_yellow(), reason);
                }
                stats.record(&outcome, &summary);
                save_cursor_cache(&cache, config)?;
            }
            Err(e) => {
                warn!("Failed to reconcile {}: {}", args.file.display(), e);
                stats.record_failure(&args.file, &e);
                cache.invalidate(&outcome.identity);
            }
        }

        last_seen = Some(fingerprint);
    }

    save_cursor_cache(&cache, config)?;
    stats.processing_time = start.elapsed();
    stats.print_summary();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_changes_with_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("01.CP");

        fs::write(&path, "[actions]\n").unwrap();
        let first = FileFingerprint::read(&path).unwrap();
        assert_eq!(first, FileFingerprint::read(&path).unwrap());

        fs::write(&path, "[actions]\n1\n").unwrap();
        let second = FileFingerprint::read(&path).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.len, 12);
    }

    #[test]
    fn test_fingerprint_of_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(FileFingerprint::read(&dir.path().join("absent.CP")).is_err());
    }
}

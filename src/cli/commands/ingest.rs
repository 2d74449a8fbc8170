//! Ingest command: concurrent batch ingestion into the JSON sink
//!
//! Files are parsed on tokio's blocking pool, at most `workers` at a time.
//! Outcomes are reconciled on the command task as they complete, so the sink
//! never sees two writes at once. A file that fails is reported and skipped.

use super::shared::{
    IngestStats, ShutdownSignal, collect_input_files, create_progress_bar, open_cursor_cache,
    save_cursor_cache,
};
use crate::app::services::cp_parser::SectionStreamParser;
use crate::app::services::ingest::{IngestOutcome, Ingestor, JsonSink, Reconciler};
use crate::cli::args::IngestArgs;
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Ingest every file named by the arguments
pub async fn run_ingest(
    args: &IngestArgs,
    config: &Config,
    show_progress: bool,
    shutdown: ShutdownSignal,
) -> Result<IngestStats> {
    let start = Instant::now();

    let files = collect_input_files(&args.inputs, config)?;
    if files.is_empty() {
        println!("{}", "No CP files found in the given inputs".bright_yellow());
        return Ok(IngestStats::default());
    }

    println!(
        "{} {} files with {} workers",
        "Ingesting".bright_green().bold(),
        files.len().to_string().bright_white().bold(),
        config.ingest.workers
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        config.ingest.output_path.display()
    );

    let cache = Arc::new(open_cursor_cache(config)?);
    let ingestor = Ingestor::new(
        SectionStreamParser::new(&config.parser.volatile_section),
        Arc::clone(&cache),
    );
    let mut sink = JsonSink::new(&config.ingest.output_path)?;

    let progress = show_progress.then(|| create_progress_bar(files.len() as u64, "Ingesting"));
    let semaphore = Arc::new(Semaphore::new(config.ingest.workers));

    let mut results = stream::iter(files)
        .map(|path| {
            let ingestor = ingestor.clone();
            let semaphore = Arc::clone(&semaphore);
            let shutdown = shutdown.clone();
            async move {
                let result = ingest_one(ingestor, semaphore, shutdown, path.clone()).await;
                (path, result)
            }
        })
        .buffer_unordered(config.ingest.workers);

    let mut stats = IngestStats::default();
    let mut interrupted = false;

    while let Some((path, result)) = results.next().await {
        if let Some(pb) = &progress {
            pb.inc(1);
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) if e.is_fatal_for_batch() => {
                interrupted = true;
                debug!("Skipped {}: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                warn!("Failed to ingest {}: {}", path.display(), e);
                stats.record_failure(&path, &e);
                continue;
            }
        };

        match sink.reconcile(&outcome) {
            Ok(summary) => stats.record(&outcome, &summary),
            Err(e) => {
                error!("Failed to reconcile {}: {}", path.display(), e);
                stats.record_failure(&path, &e);
                // The stored history no longer matches the cursor
                cache.invalidate(&outcome.identity);
            }
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    save_cursor_cache(&cache, config)?;

    stats.processing_time = start.elapsed();
    stats.print_summary();

    if interrupted {
        return Err(Error::processing_interrupted(format!(
            "Stopped after {} of the input files",
            stats.files_processed + stats.files_failed
        )));
    }

    info!(
        "Ingested {} files ({} failed)",
        stats.files_processed, stats.files_failed
    );
    Ok(stats)
}

async fn ingest_one(
    ingestor: Ingestor,
    semaphore: Arc<Semaphore>,
    shutdown: ShutdownSignal,
    path: PathBuf,
) -> Result<IngestOutcome> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|_| Error::processing_interrupted("Worker pool closed"))?;

    if *shutdown.borrow() {
        return Err(Error::processing_interrupted("Interrupted by user"));
    }

    let display = path.display().to_string();
    task::spawn_blocking(move || ingestor.ingest_path(&path))
        .await
        .map_err(|e| {
            Error::io(
                format!("Ingest task for {} failed", display),
                std::io::Error::other(e),
            )
        })?
}

//! Command implementations for the CP file processor CLI
//!
//! Each subcommand lives in its own module; configuration loading, logging
//! setup and the shared reporting types are in [`shared`].

pub mod ingest;
pub mod parse;
pub mod shared;
pub mod watch;

pub use shared::{IngestStats, ShutdownSignal};

use crate::Result;
use crate::cli::args::{Args, Commands};
use tracing::debug;

/// Main command runner
///
/// Loads the layered configuration, installs logging and dispatches:
/// - `parse`: one-off full parse to stdout
/// - `ingest`: concurrent batch ingestion into the JSON sink
/// - `watch`: polling ingestion of one growing file
pub async fn run(args: Args, shutdown: ShutdownSignal) -> Result<IngestStats> {
    let command = args.get_command()?.clone();
    let config = shared::load_configuration(&args)?;

    shared::setup_logging(&args, &config.logging.level)?;
    debug!("Loaded configuration: {:?}", config);

    match command {
        Commands::Parse(parse_args) => parse::run_parse(&parse_args, &config),
        Commands::Ingest(ingest_args) => {
            ingest::run_ingest(&ingest_args, &config, args.show_progress(), shutdown).await
        }
        Commands::Watch(watch_args) => watch::run_watch(&watch_args, &config, shutdown).await,
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use cpfile_processor::cli::{args::Args, commands};
use std::process;
use tokio::sync::watch;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match run_cli(args) {
        Ok(()) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run_cli(args: Args) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    runtime.block_on(async {
        // Commands poll this between files and between watch cycles
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                    let _ = shutdown_tx.send(true);
                }
                Err(e) => eprintln!("Failed to install CTRL+C handler: {}", e),
            }
        });

        commands::run(args, shutdown_rx)
            .await
            .context("Command failed")?;
        Ok(())
    })
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("CP File Processor - Handball Statistics Export Ingestion");
    println!("========================================================");
    println!();
    println!("Parse section-tagged CP statistics exports into per-section records,");
    println!("resuming the play-by-play section incrementally as files grow.");
    println!();
    println!("USAGE:");
    println!("    cpfile-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    parse       Parse one file in full and print JSON to stdout");
    println!("    ingest      Ingest files, directories or globs into the JSON sink");
    println!("    watch       Poll a growing file and ingest each new revision");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config     Path to configuration file (JSON)");
    println!("    -v, --verbose    Increase logging verbosity");
    println!("    -q, --quiet      Only show warnings and errors");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Inspect one export:");
    println!("    cpfile-processor parse games/01.CP --pretty");
    println!();
    println!("    # Ingest a season directory with 8 workers:");
    println!("    cpfile-processor ingest games/ -o output --workers 8");
    println!();
    println!("    # Follow a live match file:");
    println!("    cpfile-processor watch live/01.CP --interval 10");
    println!();
    println!("For detailed help on any command, use:");
    println!("    cpfile-processor <COMMAND> --help");
}

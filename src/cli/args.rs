//! Command-line argument definitions for the CP file processor
//!
//! This module defines the CLI interface using the clap derive API. Global
//! options (config file, verbosity) apply to every subcommand.

use crate::config::Config;
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the CP file processor
///
/// Parses handball federation CP statistics exports into per-section JSON,
/// resuming the play-by-play section incrementally when a file grows.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cpfile-processor",
    version,
    about = "Parse handball federation CP statistics exports incrementally",
    long_about = "Parses section-tagged CP statistics exports into per-section records. \
                  Successive uploads of the same file are resumed from a saved cursor so \
                  that only newly appended play-by-play lines are emitted, with a full \
                  re-parse whenever the file was rewritten rather than appended to."
)]
pub struct Args {
    /// Path to configuration file
    ///
    /// JSON configuration file. If not specified, looks for
    /// <config dir>/cpfile-processor/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show warnings and errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except warnings and errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse one file in full and print its sections as JSON
    Parse(ParseArgs),
    /// Ingest files, directories or glob patterns into the JSON sink
    Ingest(IngestArgs),
    /// Poll a growing file and ingest each new revision
    Watch(WatchArgs),
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// CP file to parse
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Section treated as append-only
    #[arg(long = "volatile-section", value_name = "NAME")]
    pub volatile_section: Option<String>,

    /// Encoding label to use instead of detection (e.g. windows-1252)
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Input files, directories or glob patterns
    ///
    /// Directories are walked recursively and filtered by the configured
    /// file extensions. Files named explicitly are always ingested.
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Output directory for the JSON sink
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// File the resume cursors are loaded from and saved to
    #[arg(long = "state-file", value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Number of files ingested concurrently
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Section treated as append-only
    #[arg(long = "volatile-section", value_name = "NAME")]
    pub volatile_section: Option<String>,
}

/// Arguments for the watch command
#[derive(Debug, Clone, Parser)]
pub struct WatchArgs {
    /// CP file to watch
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output directory for the JSON sink
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// Seconds between polls
    #[arg(long = "interval", value_name = "SECS")]
    pub interval: Option<u64>,

    /// File the resume cursors are loaded from and saved to
    #[arg(long = "state-file", value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Section treated as append-only
    #[arg(long = "volatile-section", value_name = "NAME")]
    pub volatile_section: Option<String>,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Result<&Commands> {
        self.command
            .as_ref()
            .ok_or_else(|| Error::configuration("No command given"))
    }

    /// Log level from the verbosity flags, or `configured` when none were given
    pub fn get_log_level(&self, configured: &str) -> String {
        if self.quiet {
            return "warn".to_string();
        }
        match self.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Apply the subcommand's overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        let (volatile_section, output_path, state_file) = match &self.command {
            Some(Commands::Parse(args)) => (&args.volatile_section, &None, &None),
            Some(Commands::Ingest(args)) => {
                if let Some(workers) = args.workers {
                    config.ingest.workers = workers;
                }
                (&args.volatile_section, &args.output_path, &args.state_file)
            }
            Some(Commands::Watch(args)) => {
                if let Some(interval) = args.interval {
                    config.ingest.poll_interval_secs = interval;
                }
                (&args.volatile_section, &args.output_path, &args.state_file)
            }
            None => return,
        };

        if let Some(section) = volatile_section {
            config.parser.volatile_section = section.clone();
        }
        if let Some(path) = output_path {
            config.ingest.output_path = path.clone();
        }
        if let Some(path) = state_file {
            config.cache.state_file = Some(path.clone());
        }
        config.logging.level = self.get_log_level(&config.logging.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_command() {
        let args = parse(&["cpfile-processor", "parse", "01.CP", "--pretty"]);

        match args.get_command().unwrap() {
            Commands::Parse(parse_args) => {
                assert_eq!(parse_args.file, PathBuf::from("01.CP"));
                assert!(parse_args.pretty);
                assert!(parse_args.encoding.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_ingest_requires_input() {
        assert!(Args::try_parse_from(["cpfile-processor", "ingest"]).is_err());

        let args = parse(&["cpfile-processor", "ingest", "a.CP", "games/", "-o", "out", "-j", "2"]);
        let Commands::Ingest(ingest) = args.get_command().unwrap() else {
            panic!("expected ingest");
        };
        assert_eq!(ingest.inputs, vec!["a.CP", "games/"]);
        assert_eq!(ingest.workers, Some(2));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["cpfile-processor", "watch", "01.CP", "-v", "--config", "c.json"]);

        assert_eq!(args.verbose, 1);
        assert_eq!(args.config_file, Some(PathBuf::from("c.json")));
        assert!(Args::try_parse_from(["cpfile-processor", "-q", "-v", "parse", "x"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&["cpfile-processor", "parse", "x"]);
        assert_eq!(args.get_log_level("info"), "info");

        args.verbose = 1;
        assert_eq!(args.get_log_level("info"), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level("info"), "trace");

        args.verbose = 0;
        args.quiet = true;
        assert_eq!(args.get_log_level("info"), "warn");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "cpfile-processor",
            "ingest",
            "in",
            "--workers",
            "3",
            "--state-file",
            "s.json",
            "--volatile-section",
            "events",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.ingest.workers, 3);
        assert_eq!(config.cache.state_file, Some(PathBuf::from("s.json")));
        assert_eq!(config.parser.volatile_section, "events");
        assert_eq!(config.ingest.output_path, PathBuf::from("output"));

        let args = parse(&["cpfile-processor", "watch", "f.CP", "--interval", "30"]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.ingest.poll_interval_secs, 30);
    }

    #[test]
    fn test_missing_command() {
        let args = parse(&["cpfile-processor"]);
        assert!(args.get_command().is_err());
    }
}

//! Parse command: one full parse printed as JSON
//!
//! Records go to stdout so the output can be piped; statistics and any
//! warnings go to the log on stderr.

use super::shared::IngestStats;
use crate::app::models::RawDocument;
use crate::app::services::cp_parser::SectionStreamParser;
use crate::app::services::encoding::decode_document;
use crate::cli::args::ParseArgs;
use crate::config::Config;
use crate::{Error, Result};
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

/// Parse one file in full and write its sections to stdout
pub fn run_parse(args: &ParseArgs, config: &Config) -> Result<IngestStats> {
    let start = Instant::now();

    let mut doc = RawDocument::from_path(&args.file)?;
    if let Some(label) = &args.encoding {
        doc = doc.with_encoding_hint(label.clone());
    }

    let decoded = decode_document(&doc)?;
    info!(
        "Decoded {} as {} (confidence {:.2})",
        args.file.display(),
        decoded.encoding.name,
        decoded.encoding.confidence
    );

    let parser = SectionStreamParser::new(&config.parser.volatile_section);
    let output = parser.parse_full(&doc.identity, &decoded.text);

    for warning in &output.stats.warnings {
        warn!("{}", warning);
    }
    info!(
        "Parsed {} lines into {} records across {} sections ({} inert)",
        output.stats.total_lines,
        output.stats.records_parsed,
        output.document.section_count(),
        output.stats.inert_lines
    );

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut handle, &output.document)?;
    } else {
        serde_json::to_writer(&mut handle, &output.document)?;
    }
    writeln!(handle).map_err(|e| Error::io("Failed to write to stdout", e))?;

    Ok(IngestStats {
        files_processed: 1,
        full_parses: 1,
        records_parsed: output.stats.records_parsed,
        new_volatile_records: output.document.section(parser.volatile_section()).len(),
        inert_lines: output.stats.inert_lines,
        processing_time: start.elapsed(),
        ..Default::default()
    })
}

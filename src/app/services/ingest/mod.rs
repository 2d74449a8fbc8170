//! Ingestion of uploaded CP files and hand-off to reconciliation
//!
//! ## Architecture
//!
//! - [`ingestor`] - Decode, look up the identity's cursor, resume or fully
//!   parse, store the advanced cursor and package an [`IngestOutcome`]
//! - [`reconcile`] - The [`Reconciler`] trait that downstream stores implement
//! - [`sink`] - [`JsonSink`], a file-based reconciler used by the CLI
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use cpfile_processor::{CursorCache, Ingestor, RawDocument, SectionStreamParser};
//! use cpfile_processor::app::services::cp_parser::ParseMode;
//!
//! let ingestor = Ingestor::new(SectionStreamParser::default(), Arc::new(CursorCache::default()));
//!
//! let first = b"[Definition]\nactions=Time;Text\n[actions]\n00:12;Goal\n".to_vec();
//! let outcome = ingestor.ingest(RawDocument::new("01.CP", first)).unwrap();
//! assert_eq!(outcome.mode, ParseMode::Full);
//!
//! let grown = b"[Definition]\nactions=Time;Text\n[actions]\n00:12;Goal\n00:40;Save\n".to_vec();
//! let outcome = ingestor.ingest(RawDocument::new("01.CP", grown)).unwrap();
//! assert_eq!(outcome.mode, ParseMode::Incremental);
//! assert_eq!(outcome.new_volatile_records, 1);
//! ```

pub mod ingestor;
pub mod reconcile;
pub mod sink;

#[cfg(test)]
mod tests;

pub use ingestor::{IngestOutcome, Ingestor};
pub use reconcile::{ReconcileSummary, Reconciler};
pub use sink::JsonSink;

//! CP file parser for federation statistics exports
//!
//! CP files are line-oriented. A `[Definition]` block declares the fields of
//! every other section as `<section>=<field1>;<field2>;...`, and each
//! `[<section>]` block holds semicolon-separated data rows. One section, the
//! play-by-play `actions` section by default, only ever grows between uploads
//! of the same file, which lets a later revision be parsed incrementally.
//!
//! ## Architecture
//!
//! The parser is organized into logical components:
//! - [`line`] - Line splitting with byte offsets and line classification
//! - [`schema`] - `[Definition]` parsing into a [`SchemaTable`]
//! - [`state`] - The Idle / InDefinition / InSection state machine
//! - [`parser`] - Full parse and incremental resume
//! - [`cursor`] - Resume cursor and fallback reasons
//! - [`stats`] - Line accounting and parse output
//!
//! ## Usage
//!
//! ```rust
//! use cpfile_processor::SectionStreamParser;
//!
//! let parser = SectionStreamParser::new("actions");
//! let first = parser.parse_full("01.CP", "[Definition]\nactions=Time;Text\n[actions]\n00:12;Goal\n");
//! assert_eq!(first.document.section("actions").len(), 1);
//!
//! let grown = "[Definition]\nactions=Time;Text\n[actions]\n00:12;Goal\n01:40;Save\n";
//! let next = parser.resume("01.CP", grown, &first.cursor);
//! assert_eq!(next.document.section("actions")[0].get("Text"), Some("Save"));
//! ```

pub mod cursor;
pub mod line;
pub mod parser;
pub mod schema;
pub mod state;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use cursor::{ParseCursor, ResumeFallback, VolatileMark};
pub use line::{LineKind, SourceLine, classify, split_lines};
pub use parser::SectionStreamParser;
pub use schema::{DefinitionLine, MalformedDefinition, SchemaRegistry, SchemaTable};
pub use state::ParserState;
pub use stats::{ParseMode, ParseOutput, ParseStats};

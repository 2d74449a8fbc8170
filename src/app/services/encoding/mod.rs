//! Encoding detection and decoding for uploaded CP files
//!
//! Export files arrive from federation tooling in whatever code page the
//! operator's machine used. Detection is best-effort: a byte-order mark or an
//! explicit hint wins, valid UTF-8 is taken at face value, and anything else is
//! handed to a statistical detector whose default applies when the evidence is
//! inconclusive. Nothing is validated against a checksum.
//!
//! ## Usage
//!
//! ```rust
//! use cpfile_processor::RawDocument;
//! use cpfile_processor::app::services::encoding::decode_document;
//!
//! let doc = RawDocument::new("01.CP", b"[Definition]\ngameinfo=Game\n".to_vec());
//! let decoded = decode_document(&doc).unwrap();
//! assert_eq!(decoded.encoding.name, "UTF-8");
//! ```

pub mod detector;


pub use detector::{DecodedText, decode_document, detect_encoding};

//! Data models for CP file processing
//!
//! This module contains the core data structures passed between the encoding
//! detector, the section parser and the reconciliation collaborator.

use crate::{Error, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// Raw Upload
// =============================================================================

/// Byte content of one upload, consumed once by the ingestor
///
/// The identity names the logical file (normally its file name). Successive
/// uploads under the same identity are treated as revisions of one file, which
/// is what allows the volatile section to be resumed instead of re-emitted.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// File identity used to key resume cursors
    pub identity: String,

    /// Raw bytes as uploaded
    pub bytes: Vec<u8>,

    /// Encoding label supplied by the uploader (e.g. "ISO-8859-1"), if any
    pub encoding_hint: Option<String>,
}

impl RawDocument {
    /// Create a document from bytes under the given identity
    pub fn new(identity: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            identity: identity.into(),
            bytes: bytes.into(),
            encoding_hint: None,
        }
    }

    /// Attach an encoding label that overrides detection when recognised
    pub fn with_encoding_hint(mut self, hint: impl Into<String>) -> Self {
        self.encoding_hint = Some(hint.into());
        self
    }

    /// Read a document from disk, using the file name as identity
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;

        Ok(Self::new(identity_for_path(path), bytes))
    }

    /// Number of bytes in the upload
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the upload has no content
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// File identity for a path: its file name, or the full path when it has none
pub fn identity_for_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// Parsed Records
// =============================================================================

/// One parsed data row: ordered field name / raw value pairs
///
/// Values stay untyped. Fields missing from a short row are absent rather than
/// empty; values beyond the schema's field count are dropped by the parser.
/// Each field name appears once: a repeated name keeps its first position and
/// takes the last value given for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip field names against row values, truncating to the shorter side
    pub fn from_row<'a, I>(field_names: &[String], values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut record = Self::new();
        for (name, value) in field_names.iter().zip(values) {
            record.push(name.as_str(), value);
        }
        record
    }

    /// Set a field value, replacing any earlier value for the same name
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Raw value for a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the record carries a value for the field
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field value as an integer, falling back to 0 when absent or unparseable
    pub fn int_or_zero(&self, name: &str) -> i64 {
        self.get(name)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }

    /// Field value as a float, falling back to 0.0 when absent or unparseable
    pub fn float_or_zero(&self, name: &str) -> f64 {
        self.get(name)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// Field names in row order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over (field, value) pairs in row order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Records serialize as JSON objects with fields in row order
impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parsed content of one file: section name to records in file order
///
/// Section names are stored lower-cased. Order across sections carries no
/// meaning; a sorted map keeps output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedDocument {
    sections: BTreeMap<String, Vec<Record>>,
}

impl ParsedDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to a section
    pub fn push(&mut self, section: &str, record: Record) {
        self.sections
            .entry(section.to_lowercase())
            .or_default()
            .push(record);
    }

    /// Records for a section (case-insensitive); empty when the section is absent
    pub fn section(&self, name: &str) -> &[Record] {
        self.sections
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any record was produced for the section
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(&name.to_lowercase())
    }

    /// Remove and return a section's records
    pub fn take_section(&mut self, name: &str) -> Vec<Record> {
        self.sections
            .remove(&name.to_lowercase())
            .unwrap_or_default()
    }

    /// Iterate over (section, records) in name order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.sections
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Section names in name order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of sections with at least one record
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total records across all sections
    pub fn total_records(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Whether no records were produced
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// =============================================================================
// Detected Encoding
// =============================================================================

/// How an encoding decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingSource {
    /// Byte-order mark at the start of the buffer
    Bom,
    /// Caller-supplied encoding label
    Hint,
    /// Buffer validated as UTF-8
    Utf8Validation,
    /// Statistical guess, possibly the detector's default
    Guess,
}

/// Encoding chosen for one upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEncoding {
    /// Canonical encoding name (e.g. "UTF-8", "windows-1252")
    pub name: String,

    /// Confidence in [0, 1]
    pub confidence: f32,

    /// Evidence the decision rests on
    pub source: EncodingSource,
}

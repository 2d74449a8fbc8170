//! Tests for the ingestion pipeline

use super::*;
use crate::Error;
use crate::app::models::{EncodingSource, RawDocument};
use crate::app::services::cp_parser::{ParseMode, ResumeFallback};
use crate::constants::sections::TEAM_STATS;
use std::thread;

fn upload(text: &str) -> RawDocument {
    RawDocument::new(IDENTITY, text.as_bytes().to_vec())
}

#[test]
fn test_first_upload_is_full() {
    let ingestor = ingestor();
    let outcome = ingestor.ingest(upload(&export(10, 3))).unwrap();

    assert_eq!(outcome.mode, ParseMode::Full);
    assert!(outcome.fallback.is_none());
    assert!(outcome.replaces_volatile());
    assert_eq!(outcome.new_volatile_records, 3);
    assert_eq!(outcome.document.section(TEAM_STATS).len(), 2);
    assert_eq!(outcome.encoding.source, EncodingSource::Utf8Validation);
    assert_eq!(outcome.revision, 1);
    assert!(ingestor.cache().get(IDENTITY).is_some());
}

#[test]
fn test_grown_upload_is_incremental() {
    let ingestor = ingestor();
    ingestor.ingest(upload(&export(10, 3))).unwrap();

    let outcome = ingestor.ingest(upload(&export(11, 5))).unwrap();

    assert_eq!(outcome.mode, ParseMode::Incremental);
    assert!(!outcome.replaces_volatile());
    assert_eq!(outcome.new_volatile_records, 2);
    assert_eq!(outcome.document.section("actions")[0].get("Name"), Some("Player3"));
    assert_eq!(outcome.document.section(TEAM_STATS)[0].int_or_zero("Goals"), 11);
    assert_eq!(outcome.revision, 2);
    assert_eq!(ingestor.cache().get(IDENTITY).unwrap().consumed(), 5);
}

#[test]
fn test_truncated_upload_replaces_history() {
    let ingestor = ingestor();
    ingestor.ingest(upload(&export(10, 6))).unwrap();

    let outcome = ingestor.ingest(upload(&export(10, 2))).unwrap();

    assert_eq!(outcome.mode, ParseMode::Full);
    assert!(matches!(outcome.fallback, Some(ResumeFallback::Truncated { .. })));
    assert_eq!(outcome.new_volatile_records, 2);
    assert_eq!(ingestor.cache().get(IDENTITY).unwrap().consumed(), 2);
}

#[test]
fn test_identities_are_independent() {
    let ingestor = ingestor();
    ingestor.ingest(upload(&export(10, 3))).unwrap();

    let other = RawDocument::new("08.CP", export(10, 4).into_bytes());
    let outcome = ingestor.ingest(other).unwrap();

    assert_eq!(outcome.mode, ParseMode::Full);
    assert_eq!(outcome.new_volatile_records, 4);
    assert_eq!(ingestor.cache().len(), 2);
}

#[test]
fn test_decode_failure_keeps_cursor() {
    let ingestor = ingestor();
    ingestor.ingest(upload(&export(10, 3))).unwrap();

    let result = ingestor.ingest(RawDocument::new(IDENTITY, Vec::new()));
    assert!(matches!(result, Err(Error::EmptyDocument { .. })));

    let outcome = ingestor.ingest(upload(&export(10, 4))).unwrap();
    assert_eq!(outcome.mode, ParseMode::Incremental);
    assert_eq!(outcome.new_volatile_records, 1);
}

#[test]
fn test_latin1_upload_is_decoded() {
    let mut bytes = b"[Definition]\nactions=Time;Name\n[actions]\n00:01;M".to_vec();
    bytes.push(0xFC); // u-umlaut in windows-1252
    bytes.extend_from_slice(b"ller\n");

    let outcome = ingestor().ingest(RawDocument::new(IDENTITY, bytes)).unwrap();

    assert_eq!(outcome.encoding.source, EncodingSource::Guess);
    assert_eq!(outcome.document.section("actions")[0].get("Name"), Some("Müller"));
}

#[test]
fn test_concurrent_uploads_of_one_identity() {
    let ingestor = ingestor();
    ingestor.ingest(upload(&export(10, 1))).unwrap();

    let handles: Vec<_> = (2..=9)
        .map(|n| {
            let ingestor = ingestor.clone();
            thread::spawn(move || ingestor.ingest(upload(&export(10, n))).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let cursor = ingestor.cache().get(IDENTITY).unwrap();
    assert_eq!(cursor.revision, 9);
}

//! Tests for cursor state persistence

use super::cursor_for;
use crate::Error;
use crate::app::services::cursor_cache::CursorCache;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const TTL: Duration = Duration::from_secs(3600);

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("cursors.json");

    let cache = CursorCache::new(TTL, 16);
    cache.insert(cursor_for("01.CP", 4));
    cache.insert(cursor_for("02.CP", 7));

    assert_eq!(cache.save(&path).unwrap(), 2);
    assert!(path.exists());
    assert!(!dir.path().join("state").join("cursors.json.tmp").exists());

    let loaded = CursorCache::load(&path, TTL, 16).unwrap();
    assert_eq!(loaded.identities(), vec!["01.CP", "02.CP"]);
    assert_eq!(loaded.get("01.CP"), cache.get("01.CP"));
    assert_eq!(loaded.get("02.CP").unwrap().consumed(), 7);
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let loaded = CursorCache::load(&dir.path().join("absent.json"), TTL, 16).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_load_corrupt_file_is_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursors.json");
    fs::write(&path, "{ not json").unwrap();

    let loaded = CursorCache::load(&path, TTL, 16).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_load_other_version_is_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursors.json");
    fs::write(
        &path,
        r#"{"version": 99, "saved_at": "2024-05-01T12:00:00Z", "cursors": []}"#,
    )
    .unwrap();

    let loaded = CursorCache::load(&path, TTL, 16).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_save_skips_empty_slots() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursors.json");

    let cache = CursorCache::new(TTL, 16);
    cache.insert(cursor_for("01.CP", 1));
    cache.with_entry("02.CP", |_| ());

    assert_eq!(cache.save(&path).unwrap(), 1);
}

#[test]
fn test_save_rejects_unusable_state_path() {
    let dir = TempDir::new().unwrap();
    let cache = CursorCache::new(TTL, 16);
    cache.insert(cursor_for("01.CP", 1));

    assert!(matches!(
        cache.save(dir.path()),
        Err(Error::CursorCache { .. })
    ));
    assert!(matches!(
        cache.save(std::path::Path::new("..")),
        Err(Error::CursorCache { .. })
    ));
}

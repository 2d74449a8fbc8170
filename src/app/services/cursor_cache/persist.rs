//! JSON persistence for the cursor cache
//!
//! The state file is rewritten in full on every save: the new content goes to a
//! sibling temporary file which is then renamed over the old one, so a crash
//! mid-write leaves the previous state intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::cache::{CacheEntry, CursorCache};
use crate::app::services::cp_parser::ParseCursor;
use crate::constants::CURSOR_STATE_VERSION;
use crate::{Error, Result};

/// On-disk form of a cursor cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorState {
    /// Format version; files with another version are ignored
    pub version: u32,

    /// When the state was written
    pub saved_at: DateTime<Utc>,

    /// One entry per identity holding a cursor
    pub cursors: Vec<PersistedCursor>,
}

/// A cursor with its last-used time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedCursor {
    pub cursor: ParseCursor,
    pub last_used: Option<DateTime<Utc>>,
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let Some(name) = path.file_name() else {
        return Err(Error::cursor_cache(format!(
            "State file path {} has no file name",
            path.display()
        )));
    };
    let mut name = name.to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}

impl CursorCache {
    /// Write every cached cursor to `path` as JSON
    ///
    /// Returns the number of cursors written. Slots without a cursor are
    /// skipped.
    pub fn save(&self, path: &Path) -> Result<usize> {
        let tmp = temp_path(path)?;
        if path.is_dir() {
            return Err(Error::cursor_cache(format!(
                "State file path {} is a directory",
                path.display()
            )));
        }

        let cursors: Vec<PersistedCursor> = self
            .entries()
            .into_iter()
            .filter_map(|(_, entry)| {
                entry.cursor.map(|cursor| PersistedCursor {
                    cursor,
                    last_used: entry.last_used,
                })
            })
            .collect();
        let count = cursors.len();

        let state = CursorState {
            version: CURSOR_STATE_VERSION,
            saved_at: Utc::now(),
            cursors,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        let json = serde_json::to_vec_pretty(&state)
            .map_err(|e| Error::serialization("Failed to encode cursor state", e))?;

        fs::write(&tmp, json)
            .map_err(|e| Error::io(format!("Failed to write {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .map_err(|e| Error::io(format!("Failed to replace {}", path.display()), e))?;

        debug!("Saved {} cursors to {}", count, path.display());
        Ok(count)
    }

    /// Load a cache from `path`
    ///
    /// A missing file gives an empty cache. A file that cannot be decoded, or
    /// was written by another format version, is logged and ignored. Other I/O
    /// failures are returned.
    pub fn load(path: &Path, idle_ttl: Duration, max_entries: usize) -> Result<Self> {
        let cache = Self::new(idle_ttl, max_entries);

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cursor state at {}, starting empty", path.display());
                return Ok(cache);
            }
            Err(e) => {
                return Err(Error::io(format!("Failed to read {}", path.display()), e));
            }
        };

        let state: CursorState = match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring unreadable cursor state {}: {}", path.display(), e);
                return Ok(cache);
            }
        };

        if state.version != CURSOR_STATE_VERSION {
            warn!(
                "Ignoring cursor state {} with version {} (expected {})",
                path.display(),
                state.version,
                CURSOR_STATE_VERSION
            );
            return Ok(cache);
        }

        let count = state.cursors.len();
        for persisted in state.cursors {
            let identity = persisted.cursor.identity.clone();
            cache.restore(
                identity,
                CacheEntry {
                    cursor: Some(persisted.cursor),
                    last_used: persisted.last_used,
                },
            );
        }

        info!(
            "Loaded {} cursors from {} (saved {})",
            count,
            path.display(),
            state.saved_at.format("%Y-%m-%d %H:%M:%S")
        );
        Ok(cache)
    }
}

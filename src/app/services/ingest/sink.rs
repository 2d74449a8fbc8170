//! File-based reconciler writing one directory per file identity
//!
//! Layout under the sink root:
//!
//! ```text
//! <root>/<identity>/<section>.json     snapshot sections, replaced every call
//! <root>/<identity>/<volatile>.jsonl   one record per line, appended or rewritten
//! ```
//!
//! Identities and section names come from uploaded files, so both are mapped to
//! `[A-Za-z0-9._-]` before they touch the filesystem.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::ingestor::IngestOutcome;
use super::reconcile::{ReconcileSummary, Reconciler};
use crate::app::models::Record;
use crate::{Error, Result};

const SNAPSHOT_EXTENSION: &str = "json";

/// Map a name from an upload to a single path component
///
/// Returns `None` when nothing usable is left, e.g. for `..`.
pub fn file_stem(name: &str) -> Option<String> {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.trim_matches('.').is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Reconciler that mirrors ingested content as JSON files
#[derive(Debug, Clone)]
pub struct JsonSink {
    root: PathBuf,
}

impl JsonSink {
    /// Create a sink writing below `root`, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| Error::io(format!("Failed to create {}", root.display()), e))?;
        Ok(Self { root })
    }

    /// Root directory of the sink
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the files for one identity
    pub fn identity_dir(&self, identity: &str) -> Result<PathBuf> {
        let name = file_stem(identity)
            .ok_or_else(|| Error::reconcile(identity, "identity has no usable file name"))?;
        Ok(self.root.join(name))
    }

    fn write_snapshot(
        &self,
        dir: &Path,
        stem: &str,
        section: &str,
        records: &[Record],
    ) -> Result<()> {
        let path = dir.join(format!("{}.{}", stem, SNAPSHOT_EXTENSION));
        let json = serde_json::to_vec_pretty(records).map_err(|e| {
            Error::serialization(format!("Failed to encode section '{}'", section), e)
        })?;
        fs::write(&path, json)
            .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))
    }

    /// Delete snapshot files whose section the latest revision no longer has
    fn remove_stale_snapshots(&self, dir: &Path, keep: &HashSet<String>) -> Result<usize> {
        let entries = fs::read_dir(dir)
            .map_err(|e| Error::io(format!("Failed to list {}", dir.display()), e))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| Error::io(format!("Failed to list {}", dir.display()), e))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if keep.contains(stem) {
                continue;
            }

            fs::remove_file(&path)
                .map_err(|e| Error::io(format!("Failed to remove {}", path.display()), e))?;
            debug!("Removed stale snapshot {}", path.display());
            removed += 1;
        }

        Ok(removed)
    }

    fn write_volatile(&self, dir: &Path, outcome: &IngestOutcome) -> Result<usize> {
        let stem = file_stem(&outcome.volatile_section).ok_or_else(|| {
            Error::reconcile(
                &outcome.identity,
                format!(
                    "volatile section '{}' has no usable file name",
                    outcome.volatile_section
                ),
            )
        })?;
        let path = dir.join(format!("{}.jsonl", stem));
        let records = outcome.document.section(&outcome.volatile_section);

        let file = if outcome.replaces_volatile() {
            File::create(&path)
        } else {
            OpenOptions::new().create(true).append(true).open(&path)
        }
        .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;

        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;

        Ok(records.len())
    }
}

impl Reconciler for JsonSink {
    fn reconcile(&mut self, outcome: &IngestOutcome) -> Result<ReconcileSummary> {
        let dir = self.identity_dir(&outcome.identity)?;
        fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("Failed to create {}", dir.display()), e))?;

        let mut summary = ReconcileSummary {
            volatile_replaced: outcome.replaces_volatile(),
            ..Default::default()
        };

        let mut written = HashSet::new();
        for (section, records) in outcome.document.sections() {
            if section == outcome.volatile_section {
                continue;
            }
            let Some(stem) = file_stem(section) else {
                warn!(
                    "Skipping section '{}' of '{}': no usable file name",
                    section, outcome.identity
                );
                summary.sections_skipped += 1;
                continue;
            };
            self.write_snapshot(&dir, &stem, section, records)?;
            written.insert(stem);
            summary.sections_written += 1;
            summary.records_written += records.len();
        }

        summary.sections_removed = self.remove_stale_snapshots(&dir, &written)?;

        summary.volatile_appended = self.write_volatile(&dir, outcome)?;

        debug!(
            "Reconciled '{}' into {}: {:?}",
            outcome.identity,
            dir.display(),
            summary
        );
        Ok(summary)
    }
}

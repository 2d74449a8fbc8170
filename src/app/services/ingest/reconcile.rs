//! Seam between ingestion and the store that reconciles parsed content

use serde::Serialize;

use super::ingestor::IngestOutcome;
use crate::Result;

/// What a reconciler did with one outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Snapshot sections written or upserted
    pub sections_written: usize,

    /// Snapshot records written or upserted
    pub records_written: usize,

    /// Stored snapshot sections dropped because the file no longer has them
    pub sections_removed: usize,

    /// Sections whose names cannot be stored
    pub sections_skipped: usize,

    /// Volatile records added to the stored history
    pub volatile_appended: usize,

    /// Whether the stored volatile history was replaced rather than extended
    pub volatile_replaced: bool,
}

/// Downstream collaborator that stores ingested content
///
/// Implementations must treat snapshot sections as replacing whatever they
/// hold for the identity, and volatile records according to
/// [`IngestOutcome::replaces_volatile`].
pub trait Reconciler {
    fn reconcile(&mut self, outcome: &IngestOutcome) -> Result<ReconcileSummary>;
}

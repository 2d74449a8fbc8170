//! Per-identity cache of resume cursors
//!
//! The ingestor keeps one [`ParseCursor`](crate::ParseCursor) per file identity
//! so that the next upload of the same file can be resumed. The cache is an
//! explicit object owned by the caller rather than process-global state.
//!
//! ## Architecture
//!
//! - [`cache`] - The [`CursorCache`] itself: a map of identity to slot, each slot
//!   behind its own mutex so that calls for one identity are serialized while
//!   different identities proceed in parallel
//! - [`persist`] - JSON save/load so incremental resume survives restarts
//!
//! Idle eviction only removes slots nobody is holding; a slot that is locked or
//! about to be locked is skipped until the next sweep.

pub mod cache;
pub mod persist;

#[cfg(test)]
mod tests;

pub use cache::{CacheEntry, CursorCache};
pub use persist::{CursorState, PersistedCursor};

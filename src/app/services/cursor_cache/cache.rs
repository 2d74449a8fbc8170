//! Cursor cache with per-identity locking and idle eviction

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::app::services::cp_parser::ParseCursor;
use crate::constants::{DEFAULT_CURSOR_IDLE_TTL_SECS, DEFAULT_CURSOR_MAX_ENTRIES};

/// One identity's slot in the cache
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// Cursor from the last successful parse, if any
    pub cursor: Option<ParseCursor>,

    /// When the slot was last used; absent until first use
    pub last_used: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        self.last_used
            .and_then(|used| now.signed_duration_since(used).to_std().ok())
            .unwrap_or_default()
    }
}

type Slot = Arc<Mutex<CacheEntry>>;

/// Map of file identity to resume cursor
///
/// Every access to one identity goes through [`CursorCache::with_entry`], which
/// holds that identity's lock for the duration of the closure. The map lock is
/// only held long enough to find or create the slot.
#[derive(Debug)]
pub struct CursorCache {
    slots: Mutex<HashMap<String, Slot>>,
    idle_ttl: Duration,
    max_entries: usize,
}

impl Default for CursorCache {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_CURSOR_IDLE_TTL_SECS),
            DEFAULT_CURSOR_MAX_ENTRIES,
        )
    }
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CursorCache {
    /// Create an empty cache
    pub fn new(idle_ttl: Duration, max_entries: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Idle time after which an unheld entry may be evicted
    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Upper bound on cached identities
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Run `f` with exclusive access to the cursor slot for `identity`
    ///
    /// The slot is created on first use. `f` may read, replace or clear the
    /// cursor; other calls for the same identity block until it returns.
    pub fn with_entry<T>(
        &self,
        identity: &str,
        f: impl FnOnce(&mut Option<ParseCursor>) -> T,
    ) -> T {
        let slot = self.slot(identity);
        let mut entry = relock(&slot);

        let result = f(&mut entry.cursor);
        entry.last_used = Some(Utc::now());
        result
    }

    /// Copy of the cached cursor for `identity`
    pub fn get(&self, identity: &str) -> Option<ParseCursor> {
        let slot = relock(&self.slots).get(identity).cloned()?;
        let entry = relock(&slot);
        entry.cursor.clone()
    }

    /// Store a cursor under its own identity
    pub fn insert(&self, cursor: ParseCursor) {
        let identity = cursor.identity.clone();
        self.with_entry(&identity, |slot| *slot = Some(cursor));
    }

    /// Forget the cursor for `identity`, forcing the next parse to be full
    pub fn invalidate(&self, identity: &str) -> bool {
        let removed = relock(&self.slots).remove(identity);
        match removed {
            Some(slot) => {
                relock(&slot).cursor = None;
                true
            }
            None => false,
        }
    }

    /// Number of identities with a slot
    pub fn len(&self) -> usize {
        relock(&self.slots).len()
    }

    /// Whether the cache holds no slots
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached identities, sorted
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = relock(&self.slots).keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Remove entries idle for longer than the configured TTL
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now())
    }

    /// Remove entries idle at `now` for longer than the configured TTL
    ///
    /// Entries that are in use, or whose slot another caller has already
    /// picked up, are left alone.
    pub fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut slots = relock(&self.slots);
        let before = slots.len();

        slots.retain(|identity, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let Ok(entry) = slot.try_lock() else {
                return true;
            };
            let keep = entry.idle_for(now) <= self.idle_ttl;
            if !keep {
                debug!("Evicting idle cursor for '{}'", identity);
            }
            keep
        });

        before - slots.len()
    }

    /// Snapshot of every entry, for persistence
    pub fn entries(&self) -> Vec<(String, CacheEntry)> {
        let slots: Vec<(String, Slot)> = relock(&self.slots)
            .iter()
            .map(|(identity, slot)| (identity.clone(), Arc::clone(slot)))
            .collect();

        let mut entries: Vec<(String, CacheEntry)> = slots
            .into_iter()
            .map(|(identity, slot)| {
                let entry = relock(&slot).clone();
                (identity, entry)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Restore an entry without touching its last-used time
    pub(crate) fn restore(&self, identity: String, entry: CacheEntry) {
        let mut slots = relock(&self.slots);
        slots.insert(identity, Arc::new(Mutex::new(entry)));
        self.enforce_capacity(&mut slots);
    }

    fn slot(&self, identity: &str) -> Slot {
        let mut slots = relock(&self.slots);
        if let Some(slot) = slots.get(identity) {
            return Arc::clone(slot);
        }

        let slot: Slot = Arc::new(Mutex::new(CacheEntry::default()));
        slots.insert(identity.to_string(), Arc::clone(&slot));
        self.enforce_capacity(&mut slots);
        slot
    }

    /// Drop least recently used unheld entries until within capacity
    fn enforce_capacity(&self, slots: &mut HashMap<String, Slot>) {
        if slots.len() <= self.max_entries {
            return;
        }

        let mut candidates: Vec<(DateTime<Utc>, String)> = slots
            .iter()
            .filter(|(_, slot)| Arc::strong_count(slot) == 1)
            .filter_map(|(identity, slot)| {
                let entry = slot.try_lock().ok()?;
                // Fresh slots are about to be used
                entry.last_used.map(|used| (used, identity.clone()))
            })
            .collect();
        candidates.sort();

        let excess = slots.len() - self.max_entries;
        for (_, identity) in candidates.into_iter().take(excess) {
            debug!("Cursor cache full, evicting '{}'", identity);
            slots.remove(&identity);
        }
    }
}

//! Thread-safe handle over the two-queue store.
//!
//! Lookups and inserts are linearized by a single lock, which is what
//! upholds the capacity invariant under concurrent inserts and keeps a
//! lookup from ever observing a torn entry.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::classification::Classification;
use crate::stats::DecoderStats;
use crate::storage::TwoQueueStore;

/// A bounded, concurrency-safe classification cache.
///
/// Cloning produces another handle to the same underlying store. Evictions
/// are recorded on the shared stats so the reporting surface can expose
/// them.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use ua_decoder::{Cache, Classification, DecoderStats};
///
/// let cache = Cache::new(128, Arc::new(DecoderStats::new()));
/// cache.insert("curl/7.68.0".to_string(), Classification::default());
/// assert!(cache.get("curl/7.68.0").is_some());
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<RwLock<TwoQueueStore>>,
    stats: Arc<DecoderStats>,
    capacity: usize,
}

impl Cache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics when `capacity` is zero; callers disable caching by not
    /// constructing a cache at all.
    pub fn new(capacity: usize, stats: Arc<DecoderStats>) -> Self {
        Self {
            store: Arc::new(RwLock::new(TwoQueueStore::new(capacity))),
            stats,
            capacity,
        }
    }

    /// Look up a key, returning a copy of the stored classification.
    ///
    /// A hit refreshes the entry's queue position, so this takes the write
    /// lock even though the caller only reads.
    pub fn get(&self, key: &str) -> Option<Classification> {
        self.write_lock()?.get(key)
    }

    /// Insert an entry, evicting per the two-queue policy when full.
    pub fn insert(&self, key: String, value: Classification) {
        if let Some(mut store) = self.write_lock() {
            if store.insert(key, value) {
                self.stats.record_eviction();
            }
        }
    }

    /// Check residency without touching queue positions.
    pub fn contains(&self, key: &str) -> bool {
        self.read_lock().map(|s| s.contains(key)).unwrap_or(false)
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.read_lock().map(|s| s.len()).unwrap_or(0)
    }

    /// True when no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn read_lock(&self) -> Option<RwLockReadGuard<'_, TwoQueueStore>> {
        self.store.read().ok()
    }

    fn write_lock(&self) -> Option<RwLockWriteGuard<'_, TwoQueueStore>> {
        self.store.write().ok()
    }
}

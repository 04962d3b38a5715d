//! Atomic counters and the reporting snapshot.
//!
//! Counters are incremented lock-free on the resolve hot path and read
//! infrequently by the reporting surface. `messages == hits + misses`
//! holds for any read that is not interleaved with an in-flight resolve.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for the decode hot path.
///
/// All counters are atomic and safe to increment from any number of
/// threads. They are created at decoder construction and reset only by
/// constructing a new decoder.
#[derive(Debug, Default)]
pub struct DecoderStats {
    /// Resolve calls performed (one per decoded record).
    messages: AtomicU64,

    /// Resolves answered from the cache.
    hits: AtomicU64,

    /// Resolves that had to run the classifier.
    misses: AtomicU64,

    /// Entries evicted to stay within capacity.
    evictions: AtomicU64,
}

impl DecoderStats {
    /// Create a stats instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolve call.
    pub fn record_message(&self) {
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a capacity eviction.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Resolve calls performed so far.
    pub fn messages(&self) -> u64 {
        self.messages.load(Ordering::Relaxed)
    }

    /// Cache hits so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Cache misses so far.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Capacity evictions so far.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Hit ratio as a percentage, rounded to three decimal places.
    ///
    /// Reported as `0.0` before any resolve has completed.
    pub fn hit_ratio_percent(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            return 0.0;
        }
        round3(hits as f64 / total as f64 * 100.0)
    }

    /// Build a point-in-time report, combining the counters with the
    /// cache occupancy supplied by the owner.
    pub fn report(&self, cache_size: u64, cache_capacity: u64) -> Report {
        Report {
            process_message_count: self.messages(),
            process_cache_hit: self.hits(),
            process_cache_miss: self.misses(),
            process_cache_hit_ratio: self.hit_ratio_percent(),
            process_cache_eviction: self.evictions(),
            process_cache_size: cache_size,
            process_cache_max_size: cache_capacity,
        }
    }
}

/// Round to three decimal places, half-up.
fn round3(f: f64) -> f64 {
    ((f * 1000.0) + 0.5).floor() / 1000.0
}

/// A point-in-time snapshot of the decoder metrics.
///
/// Plain values, serializable with the exported metric names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    pub process_message_count: u64,
    pub process_cache_hit: u64,
    pub process_cache_miss: u64,
    pub process_cache_hit_ratio: f64,
    pub process_cache_eviction: u64,
    pub process_cache_size: u64,
    pub process_cache_max_size: u64,
}

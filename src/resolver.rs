//! Lookup-or-compute dispatch with hit/miss accounting.

use std::sync::Arc;

use crate::cache::Cache;
use crate::classification::Classification;
use crate::classifier::Classifier;
use crate::stats::DecoderStats;

/// Wraps the classifier behind an optional bounded cache.
///
/// With no cache every call recomputes; with one, a resident key is
/// answered without touching the classifier. Safe to call from any number
/// of threads: the classifier is immutable and the cache linearizes its
/// own access.
#[derive(Debug, Clone)]
pub struct Resolver {
    classifier: Arc<Classifier>,
    cache: Option<Cache>,
    stats: Arc<DecoderStats>,
}

impl Resolver {
    /// Build a resolver; `cache` is `None` when caching is disabled.
    pub fn new(classifier: Arc<Classifier>, cache: Option<Cache>, stats: Arc<DecoderStats>) -> Self {
        Self {
            classifier,
            cache,
            stats,
        }
    }

    /// Return the classification for `raw` and whether it came from cache.
    ///
    /// Every call counts one message plus exactly one hit or miss. On a
    /// miss the classifier runs outside the cache lock; two threads
    /// missing the same key may both classify, inserting identical values.
    pub fn resolve(&self, raw: &str) -> (Classification, bool) {
        self.stats.record_message();

        let Some(cache) = &self.cache else {
            self.stats.record_miss();
            return (self.classifier.classify(raw), false);
        };

        if let Some(found) = cache.get(raw) {
            self.stats.record_hit();
            return (found, true);
        }

        let computed = self.classifier.classify(raw);
        cache.insert(raw.to_string(), computed.clone());
        self.stats.record_miss();
        (computed, false)
    }

    /// The shared counters this resolver records into.
    pub fn stats(&self) -> &Arc<DecoderStats> {
        &self.stats
    }

    /// The cache handle, when caching is enabled.
    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }
}

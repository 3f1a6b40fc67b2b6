//! Cache Metrics System
//!
//! Counter-based metrics for the cache, reported through the [`CacheMetrics`]
//! trait as a `BTreeMap<String, f64>`.
//!
//! BTreeMap is used instead of HashMap so that metrics always come out in the
//! same order, which keeps logs and test assertions reproducible.
//!
//! Only entry counts are tracked. The cache has no notion of object size.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod lru;

pub use lru::LruCacheMetrics;

/// Counters common to lookup-based caches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of lookups made against the cache
    pub requests: u64,

    /// Number of lookups that found a live entry
    pub cache_hits: u64,

    /// Number of new entries written into the cache
    pub insertions: u64,

    /// Number of `put` calls that replaced the value of an existing entry
    pub updates: u64,

    /// Number of entries evicted because the cache was full
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key.
    ///
    /// Misses are derived as `requests - cache_hits`.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a new key written into the cache.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a `put` that replaced an existing value.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records a capacity-driven eviction of the least recently used entry.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Lookups that found nothing, or found an entry and evicted it.
    #[inline]
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Fraction of lookups that hit, or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, or 0.0 before the first lookup.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters into a deterministically ordered map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics reporting interface.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs, sorted by key.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification, e.g. `"LRU"`.
    fn algorithm_name(&self) -> &'static str;
}

//! LRU Cache Metrics
//!
//! Metrics specific to the bounded LRU cache: on top of the core counters it
//! tracks entries dropped by caller predicates and by explicit removal.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// LRU-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruCacheMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Entries removed because a caller predicate matched, either during a
    /// lookup (`get_or_evict`, `exists_or_evict`) or in `remove_if`
    pub predicate_evictions: u64,

    /// Entries removed by key through `remove`
    pub removals: u64,
}

impl LruCacheMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry dropped because a caller predicate matched.
    pub fn record_predicate_eviction(&mut self) {
        self.predicate_evictions += 1;
    }

    /// Records an entry removed by key.
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Converts LRU metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert(
            "predicate_evictions".to_string(),
            self.predicate_evictions as f64,
        );
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics
    }
}

impl CacheMetrics for LruCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_specific_counters_are_reported() {
        let mut metrics = LruCacheMetrics::new();
        metrics.record_predicate_eviction();
        metrics.record_predicate_eviction();
        metrics.record_predicate_eviction();
        metrics.record_removal();
        metrics.core.record_eviction();

        let map = metrics.metrics();
        assert_eq!(map.get("predicate_evictions"), Some(&3.0));
        assert_eq!(map.get("removals"), Some(&1.0));
        assert_eq!(map.get("evictions"), Some(&1.0));
        assert_eq!(metrics.algorithm_name(), "LRU");
    }
}

//! Thread-Safe Bounded LRU Cache
//!
//! [`BoundedLruCache`] wraps a single unsynchronized LRU segment in a
//! `parking_lot::Mutex`. Every public operation holds that one lock from start
//! to finish, so all operations on a cache instance are linearizable and the
//! LRU order is exact and global.
//!
//! ## Why one Mutex?
//!
//! Every lookup mutates recency order, so a `RwLock` would hand out write
//! locks anyway. Lock striping would scale better but makes eviction order
//! per-shard, which is not LRU. The cache targets low to medium contention.
//!
//! ## Callbacks run under the lock
//!
//! `update`, `evict_if`, `remove_if` predicates and `get_or_insert_with`
//! factories execute while the lock is held:
//!
//! - they must not call back into the same cache (the mutex is not reentrant
//!   and the thread deadlocks);
//! - they should be short, since every other caller waits on them;
//! - if they panic, the lock is released during unwinding and the cache stays
//!   consistent and usable (`parking_lot` does not poison).
//!
//! # Example
//!
//! ```rust
//! use bounded_lru::BoundedLruCache;
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(BoundedLruCache::new(NonZeroUsize::new(1000).unwrap()));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 cache.put(format!("key-{}-{}", t, i), i);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//! assert_eq!(cache.len(), 400);
//! ```

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::error::ConfigError;
use crate::lru::{into_ok, LruSegment};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A fixed-capacity, thread-safe LRU cache with predicate-driven lookups.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone`.
/// - `V`: Value type. Must implement `Clone`; lookups return copies so no
///   reference escapes the lock.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Touching
///
/// `put` of an existing key, a successful `get*`, a successful
/// [`exists_or_evict`](Self::exists_or_evict) and a
/// [`get_or_insert_with`](Self::get_or_insert_with) hit move the entry to the
/// most recently used position. [`contains_key`](Self::contains_key) does not.
///
/// # Example
///
/// ```rust
/// use bounded_lru::BoundedLruCache;
///
/// let cache = BoundedLruCache::try_new(3).unwrap();
/// cache.put(1, 1);
/// cache.put(2, 2);
/// cache.put(3, 3);
///
/// cache.get(&1); // 1 becomes most recently used
/// cache.put(4, 4); // evicts 2
///
/// assert!(cache.contains_key(&1));
/// assert!(!cache.contains_key(&2));
/// assert!(cache.contains_key(&4));
/// ```
pub struct BoundedLruCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LruSegment<K, V, S>>,
}

impl<K, V> BoundedLruCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::init(LruCacheConfig::new(capacity), None)
    }

    /// Creates a cache from a plain count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is 0.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCacheConfig::try_new(capacity).map(|config| Self::init(config, None))
    }

    /// Creates a cache from a configuration with an optional hasher.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bounded_lru::config::LruCacheConfig;
    /// use bounded_lru::BoundedLruCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let config = LruCacheConfig {
    ///     capacity: NonZeroUsize::new(10_000).unwrap(),
    /// };
    /// let cache: BoundedLruCache<String, Vec<u8>> = BoundedLruCache::init(config, None);
    /// assert!(cache.is_empty());
    /// ```
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K, V, S> BoundedLruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Creates a cache with a custom hash builder.
    pub fn with_hasher(capacity: NonZeroUsize, hash_builder: S) -> Self {
        Self::init_with_hasher(LruCacheConfig::new(capacity), hash_builder)
    }

    /// Creates a cache from a configuration and a custom hash builder.
    ///
    /// Use this for deterministic hashing or DoS-resistant hashers.
    pub fn init_with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        log::debug!("creating bounded LRU cache: {:?}", config);
        Self {
            segment: Mutex::new(LruSegment::with_hasher(config, hash_builder)),
        }
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.segment.lock().cap()
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if the cache contains no entries.
    pub fn is_empty(&self) -> bool {
        self.segment.lock().is_empty()
    }

    /// Inserts a key-value pair.
    ///
    /// If the key exists, its value is replaced and it becomes most recently
    /// used. If the key is new and the cache is full, the least recently used
    /// entry is evicted first, so the capacity is never exceeded.
    ///
    /// # Returns
    ///
    /// - `Some((evicted_key, evicted_value))` if an entry was evicted
    /// - `None` otherwise
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.segment.lock().put(key, value)
    }

    /// Retrieves a copy of the value and marks the entry most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Applies `f` to the value while holding the lock, touching the entry.
    ///
    /// Avoids cloning when only part of the value is needed.
    ///
    /// ```rust
    /// use bounded_lru::BoundedLruCache;
    ///
    /// let cache = BoundedLruCache::try_new(4).unwrap();
    /// cache.put("greeting", String::from("hello"));
    /// assert_eq!(cache.get_with("greeting", |s| s.len()), Some(5));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Mutates the value in place, touches the entry and returns a copy of
    /// the updated value.
    ///
    /// ```rust
    /// use bounded_lru::BoundedLruCache;
    ///
    /// let cache = BoundedLruCache::try_new(4).unwrap();
    /// cache.put("hits", 0u32);
    /// assert_eq!(cache.get_and_update("hits", |n| *n += 1), Some(1));
    /// assert_eq!(cache.get_and_update("hits", |n| *n += 1), Some(2));
    /// ```
    pub fn get_and_update<Q, U>(&self, key: &Q, update: U) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V),
    {
        self.get_or_evict(key, update, |_| false)
    }

    /// Conditional lookup in one locked step.
    ///
    /// 1. If `key` is absent, returns `None` without calling anything.
    /// 2. `evict_if` sees the current value. If it returns `true` the entry is
    ///    removed and `None` is returned; `update` is not called.
    /// 3. Otherwise `update` mutates the value in place, the entry becomes
    ///    most recently used and a copy of the updated value is returned.
    ///
    /// ```rust
    /// use bounded_lru::BoundedLruCache;
    ///
    /// let cache = BoundedLruCache::try_new(4).unwrap();
    /// cache.put("session", 300);
    ///
    /// // Expire on read
    /// assert_eq!(cache.get_or_evict("session", |_| {}, |v| *v == 300), None);
    /// assert!(!cache.contains_key("session"));
    /// ```
    pub fn get_or_evict<Q, U, P>(&self, key: &Q, update: U, evict_if: P) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V),
        P: FnOnce(&V) -> bool,
    {
        self.segment
            .lock()
            .get_or_evict(key, update, evict_if)
            .cloned()
    }

    /// Fallible form of [`get_or_evict`](Self::get_or_evict).
    ///
    /// An `Err` from either callback is returned unchanged. The entry is then
    /// neither removed nor touched, though a failing `update` may already have
    /// changed the value in place.
    pub fn try_get_or_evict<Q, U, P, E>(&self, key: &Q, update: U, evict_if: P) -> Result<Option<V>, E>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V) -> Result<(), E>,
        P: FnOnce(&V) -> Result<bool, E>,
    {
        let mut segment = self.segment.lock();
        let found = segment.try_get_or_evict(key, update, evict_if)?;
        Ok(found.cloned())
    }

    /// Pure existence check.
    ///
    /// Does not touch the entry and does not count as a lookup in metrics.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Existence check with the side effects of [`get_or_evict`](Self::get_or_evict).
    ///
    /// **This is not a pure read.** It runs `evict_if` (possibly removing the
    /// entry), then `update`, then moves the entry to the most recently used
    /// position. Returns whether the key is still present afterwards. Use
    /// [`contains_key`](Self::contains_key) for a side-effect-free check.
    ///
    /// ```rust
    /// use bounded_lru::BoundedLruCache;
    ///
    /// let cache = BoundedLruCache::try_new(3).unwrap();
    /// cache.put(2, 2);
    /// assert!(cache.exists_or_evict(&2, |v| *v *= 2, |_| false));
    /// assert_eq!(cache.get(&2), Some(4));
    /// assert!(!cache.exists_or_evict(&2, |_| {}, |_| true));
    /// ```
    pub fn exists_or_evict<Q, U, P>(&self, key: &Q, update: U, evict_if: P) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V),
        P: FnOnce(&V) -> bool,
    {
        into_ok(self.try_exists_or_evict(
            key,
            |value| {
                update(value);
                Ok(())
            },
            |value| Ok(evict_if(value)),
        ))
    }

    /// Fallible form of [`exists_or_evict`](Self::exists_or_evict).
    pub fn try_exists_or_evict<Q, U, P, E>(&self, key: &Q, update: U, evict_if: P) -> Result<bool, E>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V) -> Result<(), E>,
        P: FnOnce(&V) -> Result<bool, E>,
    {
        self.segment.lock().try_exists_or_evict(key, update, evict_if)
    }

    /// Removes a key from the cache.
    ///
    /// # Returns
    ///
    /// - `Some(value)` if the key existed
    /// - `None` if the key was not found
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().remove(key)
    }

    /// Removes every entry whose value satisfies `predicate`.
    ///
    /// Each entry is evaluated exactly once, from most to least recently
    /// used. Returns the number of entries removed.
    ///
    /// ```rust
    /// use bounded_lru::BoundedLruCache;
    ///
    /// let cache = BoundedLruCache::try_new(8).unwrap();
    /// for i in 0..6 {
    ///     cache.put(i, i);
    /// }
    /// assert_eq!(cache.remove_if(|v| v % 2 == 0), 3);
    /// assert_eq!(cache.len(), 3);
    /// ```
    pub fn remove_if<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&V) -> bool,
    {
        into_ok(self.try_remove_if(|value| Ok(predicate(value))))
    }

    /// Fallible form of [`remove_if`](Self::remove_if).
    ///
    /// Stops at the first `Err`, which is returned; entries removed before
    /// the failure stay removed.
    pub fn try_remove_if<P, E>(&self, predicate: P) -> Result<usize, E>
    where
        P: FnMut(&V) -> Result<bool, E>,
    {
        self.segment.lock().try_remove_if(predicate)
    }

    /// Returns the cached value for `key`, or computes, caches and returns it.
    ///
    /// `make` runs under the lock, so concurrent callers for the same key
    /// compute it only once.
    ///
    /// ```rust
    /// use bounded_lru::BoundedLruCache;
    ///
    /// let squares = BoundedLruCache::try_new(16).unwrap();
    /// assert_eq!(squares.get_or_insert_with(12u64, || 12 * 12), 144);
    /// assert_eq!(squares.get_or_insert_with(12u64, || unreachable!()), 144);
    /// ```
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        into_ok(self.try_get_or_insert_with(key, || Ok(make())))
    }

    /// Fallible form of [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// On `Err` nothing is inserted and nothing is evicted.
    pub fn try_get_or_insert_with<F, E>(&self, key: K, make: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.segment.lock().try_get_or_insert_with(key, make)
    }

    /// Removes all entries.
    pub fn clear(&self) {
        let mut segment = self.segment.lock();
        log::debug!("clearing bounded LRU cache with {} entries", segment.len());
        segment.clear();
    }

    /// Returns a copy of the current counters.
    pub fn metrics_snapshot(&self) -> LruCacheMetrics {
        *self.segment.lock().metrics()
    }
}

impl<K, V, S> CacheMetrics for BoundedLruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

impl<K, V, S> fmt::Debug for BoundedLruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_lock: Debug may be reached from inside a callback
        match self.segment.try_lock() {
            Some(segment) => f
                .debug_struct("BoundedLruCache")
                .field("segment", &*segment)
                .finish(),
            None => f
                .debug_struct("BoundedLruCache")
                .field("segment", &"<locked>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use std::sync::Arc;
    use std::thread;

    fn make_cache<K: Hash + Eq + Clone, V: Clone>(cap: usize) -> BoundedLruCache<K, V> {
        BoundedLruCache::try_new(cap).unwrap()
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BoundedLruCache<String, Vec<u8>>>();
    }

    #[test]
    fn test_try_new_rejects_zero() {
        let result = BoundedLruCache::<u8, u8>::try_new(0);
        assert_eq!(result.err(), Some(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_basic_operations() {
        let cache: BoundedLruCache<String, i32> = make_cache(100);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), Some(2));
        assert_eq!(cache.get(&"c".to_string()), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity().get(), 100);
    }

    #[test]
    fn test_borrowed_key_lookup() {
        let cache: BoundedLruCache<String, i32> = make_cache(10);

        cache.put("test_key".to_string(), 42);

        let key_str = "test_key";
        assert_eq!(cache.get(key_str), Some(42));
        assert!(cache.contains_key(key_str));
        assert_eq!(cache.remove(key_str), Some(42));
        assert_eq!(cache.remove(key_str), None);
    }

    #[test]
    fn test_put_returns_evicted_entry() {
        let cache = make_cache(2);
        assert_eq!(cache.put("a", 1), None);
        assert_eq!(cache.put("b", 2), None);
        assert_eq!(cache.put("a", 10), None);
        assert_eq!(cache.put("c", 3), Some(("b", 2)));
    }

    #[test]
    fn test_exists_or_evict_update_sequence() {
        let cache = make_cache(3);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        let last = Cell::new(0);
        let double = |x: &mut i32| {
            *x *= 2;
            last.set(*x);
        };

        assert!(cache.exists_or_evict(&1, double, |_| false));
        assert_eq!(last.get(), 2);
        assert!(cache.exists_or_evict(&3, double, |_| false));
        assert_eq!(last.get(), 6);
        assert!(cache.exists_or_evict(&2, double, |_| false));
        assert_eq!(last.get(), 4);

        // evicting predicate wins over update
        assert!(!cache.exists_or_evict(&2, double, |_| true));
        assert_eq!(last.get(), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_exists_or_evict_touches() {
        let cache = make_cache(2);
        cache.put(1, 1);
        cache.put(2, 2);
        assert!(cache.exists_or_evict(&1, |_| {}, |_| false));
        cache.put(3, 3);
        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
    }

    #[test]
    fn test_try_get_or_evict_propagates_error() {
        let cache = make_cache(2);
        cache.put("k", 5);
        let result: Result<Option<i32>, &str> =
            cache.try_get_or_evict("k", |_| Ok(()), |_| Err("predicate failed"));
        assert_eq!(result, Err("predicate failed"));
        assert_eq!(cache.get("k"), Some(5));
    }

    #[test]
    fn test_panicking_callback_releases_lock() {
        let cache = Arc::new(make_cache::<i32, i32>(4));
        cache.put(1, 1);

        let worker = Arc::clone(&cache);
        let joined = thread::spawn(move || {
            worker.get_and_update(&1, |_| panic!("update failed"));
        })
        .join();
        assert!(joined.is_err());

        // lock is free and the entry survived
        assert_eq!(cache.get(&1), Some(1));
        cache.put(2, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear() {
        let cache: BoundedLruCache<String, i32> = make_cache(100);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("c".to_string(), 3);

        assert_eq!(cache.len(), 3);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_metrics() {
        let cache = make_cache(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get("a");
        cache.get("missing");
        cache.put("c", 3);
        cache.get_or_evict("a", |_| {}, |v| *v == 1);
        cache.remove("c");

        let metrics = cache.metrics();
        assert_eq!(metrics.get("requests"), Some(&3.0));
        assert_eq!(metrics.get("cache_hits"), Some(&1.0));
        assert_eq!(metrics.get("cache_misses"), Some(&2.0));
        assert_eq!(metrics.get("insertions"), Some(&3.0));
        assert_eq!(metrics.get("evictions"), Some(&1.0));
        assert_eq!(metrics.get("predicate_evictions"), Some(&1.0));
        assert_eq!(metrics.get("removals"), Some(&1.0));
        assert_eq!(cache.algorithm_name(), "LRU");

        let snapshot = cache.metrics_snapshot();
        assert_eq!(snapshot.core.requests, 3);
    }

    #[test]
    fn test_debug_output() {
        let cache: BoundedLruCache<i32, i32> = make_cache(3);
        cache.put(1, 1);
        let rendered = format!("{:?}", cache);
        assert!(rendered.contains("BoundedLruCache"));
        assert!(rendered.contains("len: 1"));
    }

    #[test]
    fn test_init_with_hasher() {
        let hasher = DefaultHashBuilder::default();
        let config = LruCacheConfig::try_new(10).unwrap();
        let cache: BoundedLruCache<String, i32, _> =
            BoundedLruCache::init_with_hasher(config, hasher);

        cache.put("test".to_string(), 42);
        assert_eq!(cache.get(&"test".to_string()), Some(42));
    }

    #[test]
    fn test_concurrent_access() {
        let cache: Arc<BoundedLruCache<String, usize>> = Arc::new(make_cache(1000));
        let num_threads = 8;
        let ops_per_thread = 1000;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = format!("thread_{}_key_{}", t, i);
                    cache.put(key.clone(), t * 1000 + i);
                    let _ = cache.get(&key);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1000);
        cache.segment.lock().debug_validate_invariants();
    }

    #[test]
    fn test_concurrent_mixed_operations() {
        let cache: Arc<BoundedLruCache<String, usize>> = Arc::new(make_cache(100));
        let num_threads = 8;
        let ops_per_thread = 500;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = format!("key_{}", i % 200);

                    match i % 5 {
                        0 => {
                            cache.put(key, i);
                        }
                        1 => {
                            let _ = cache.get(&key);
                        }
                        2 => {
                            cache.get_and_update(&key, |v| *v += 1);
                        }
                        3 => {
                            cache.get_or_evict(&key, |_| {}, |v| v % 7 == 0);
                        }
                        4 => {
                            let _ = cache.remove(&key);
                        }
                        _ => unreachable!(),
                    }

                    if i == 250 && t == 0 {
                        cache.remove_if(|v| v % 3 == 0);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 100);
        cache.segment.lock().debug_validate_invariants();
    }
}

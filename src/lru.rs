//! Least Recently Used (LRU) Segment
//!
//! The unsynchronized core of [`BoundedLruCache`](crate::BoundedLruCache).
//! Every operation takes `&mut self`; the public cache wraps one segment in a
//! mutex.
//!
//! # Algorithm
//!
//! Entries live in an arena-backed recency [`List`], most recently touched at
//! the front. A hash map indexes each key to the [`SlotId`] of its node, so
//! lookup, touch and erase are O(1). When a new key arrives and the segment is
//! full, the back of the list is evicted before the new entry is inserted.
//!
//! # Callback ordering
//!
//! Lookups accept an `evict_if` predicate and an `update` function. The
//! predicate always runs first; if it matches, the entry is removed and the
//! update never runs. Both callbacks run before any change to the list or the
//! index, so a callback that fails or panics leaves the structure intact.

#[cfg(test)]
extern crate alloc;

use crate::config::LruCacheConfig;
use crate::list::{List, SlotId};
use crate::metrics::LruCacheMetrics;
use core::borrow::Borrow;
use core::convert::Infallible;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Upper bound on up-front allocation; larger caches grow on demand.
const MAX_PREALLOCATED: usize = 1 << 16;

/// Unwraps a result whose error type is uninhabited.
#[inline]
pub(crate) fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

pub(crate) struct LruSegment<K, V, S> {
    config: LruCacheConfig,
    list: List<(K, V)>,
    map: HashMap<K, SlotId, S>,
    metrics: LruCacheMetrics,
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruSegment<K, V, S> {
    pub(crate) fn with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        let prealloc = config.capacity().get().min(MAX_PREALLOCATED);
        LruSegment {
            config,
            list: List::with_capacity(prealloc),
            map: HashMap::with_capacity_and_hasher(prealloc, hash_builder),
            metrics: LruCacheMetrics::new(),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.config.capacity()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    /// Pure presence check: no touch, no metrics.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Inserts or replaces `key`.
    ///
    /// Returns the entry evicted to make room, if any. Replacing the value of
    /// an existing key never evicts.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&id) = self.map.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.1 = value;
                self.list.move_to_front(id);
                self.metrics.core.record_update();
                return None;
            }
        }
        self.insert_new(key, value)
    }

    /// Looks up `key`, giving `evict_if` the chance to drop the entry and
    /// `update` the chance to mutate it, then touches it.
    ///
    /// Returns the handle of the (still present) entry.
    fn try_lookup<Q, U, P, E>(&mut self, key: &Q, update: U, evict_if: P) -> Result<Option<SlotId>, E>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V) -> Result<(), E>,
        P: FnOnce(&V) -> Result<bool, E>,
    {
        let Some(&id) = self.map.get(key) else {
            self.metrics.core.record_miss();
            return Ok(None);
        };
        let Some((_, value)) = self.list.get_mut(id) else {
            self.metrics.core.record_miss();
            return Ok(None);
        };

        if evict_if(&*value)? {
            self.unlink(id);
            self.metrics.record_predicate_eviction();
            self.metrics.core.record_miss();
            log::trace!("entry evicted on lookup; len={}", self.map.len());
            return Ok(None);
        }

        update(value)?;
        self.list.move_to_front(id);
        self.metrics.core.record_hit();
        Ok(Some(id))
    }

    pub(crate) fn try_get_or_evict<Q, U, P, E>(
        &mut self,
        key: &Q,
        update: U,
        evict_if: P,
    ) -> Result<Option<&V>, E>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V) -> Result<(), E>,
        P: FnOnce(&V) -> Result<bool, E>,
    {
        let id = self.try_lookup(key, update, evict_if)?;
        Ok(id.and_then(|id| self.list.get(id)).map(|(_, value)| value))
    }

    pub(crate) fn get_or_evict<Q, U, P>(&mut self, key: &Q, update: U, evict_if: P) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V),
        P: FnOnce(&V) -> bool,
    {
        into_ok(self.try_get_or_evict(
            key,
            |value| {
                update(value);
                Ok(())
            },
            |value| Ok(evict_if(value)),
        ))
    }

    #[inline]
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_or_evict(key, |_| {}, |_| false)
    }

    pub(crate) fn try_exists_or_evict<Q, U, P, E>(
        &mut self,
        key: &Q,
        update: U,
        evict_if: P,
    ) -> Result<bool, E>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        U: FnOnce(&mut V) -> Result<(), E>,
        P: FnOnce(&V) -> Result<bool, E>,
    {
        Ok(self.try_lookup(key, update, evict_if)?.is_some())
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.remove(key)?;
        let (_, value) = self.list.remove(id)?;
        self.metrics.record_removal();
        Some(value)
    }

    /// Evaluates `predicate` once per entry, front to back, removing matches.
    ///
    /// Stops at the first error; entries removed before it stay removed.
    pub(crate) fn try_remove_if<P, E>(&mut self, mut predicate: P) -> Result<usize, E>
    where
        P: FnMut(&V) -> Result<bool, E>,
    {
        let mut removed = 0;
        let mut cursor = self.list.front_id();
        while let Some(id) = cursor {
            cursor = self.list.next_id(id);
            let matched = match self.list.get(id) {
                Some((_, value)) => predicate(value)?,
                None => false,
            };
            if matched && self.unlink(id).is_some() {
                self.metrics.record_predicate_eviction();
                removed += 1;
            }
        }
        if removed > 0 {
            log::trace!("removed {} entries by predicate; len={}", removed, self.map.len());
        }
        Ok(removed)
    }

    /// Returns the value for `key`, computing and inserting it on a miss.
    ///
    /// `make` runs before anything is evicted, so an error leaves the
    /// segment as it was.
    pub(crate) fn try_get_or_insert_with<F, E>(&mut self, key: K, make: F) -> Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(&id) = self.map.get(&key) {
            if let Some((_, value)) = self.list.get(id) {
                let value = value.clone();
                self.list.move_to_front(id);
                self.metrics.core.record_hit();
                return Ok(value);
            }
        }

        let value = make()?;
        self.metrics.core.record_miss();
        self.insert_new(key, value.clone());
        Ok(value)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }

    /// Inserts a key known to be absent, evicting the LRU entry if full.
    fn insert_new(&mut self, key: K, value: V) -> Option<(K, V)> {
        let evicted = if self.map.len() >= self.cap().get() {
            self.evict_lru()
        } else {
            None
        };
        let id = self.list.push_front((key.clone(), value));
        self.map.insert(key, id);
        self.metrics.core.record_insertion();
        evicted
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        let id = self.list.back_id()?;
        let entry = self.unlink(id)?;
        self.metrics.core.record_eviction();
        log::trace!("evicted least recently used entry; len={}", self.map.len());
        Some(entry)
    }

    /// Removes the node `id` from both the list and the index.
    fn unlink(&mut self, id: SlotId) -> Option<(K, V)> {
        let (key, value) = self.list.remove(id)?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Asserts the index and the recency list describe the same entries.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        assert_eq!(self.map.len(), self.list.len(), "index/list size mismatch");
        assert!(self.map.len() <= self.cap().get(), "capacity exceeded");
        for (key, &id) in self.map.iter() {
            let (stored, _) = self.list.get(id).expect("index points at a free slot");
            assert!(stored == key, "index points at a node with another key");
        }
    }

    #[cfg(test)]
    pub(crate) fn keys_front_to_back(&self) -> alloc::vec::Vec<K> {
        self.list.iter().map(|(key, _)| key.clone()).collect()
    }
}

impl<K, V, S> core::fmt::Debug for LruSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruSegment")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .finish()
    }
}

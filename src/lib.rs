#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Quick Reference
//!
//! | Operation | Touches entry | Notes |
//! |-----------|---------------|-------|
//! | [`put`](BoundedLruCache::put) | yes | evicts the LRU entry when a new key arrives at capacity |
//! | [`get`](BoundedLruCache::get) | on hit | returns a copy of the value |
//! | [`get_and_update`](BoundedLruCache::get_and_update) | on hit | mutates in place, then returns a copy |
//! | [`get_or_evict`](BoundedLruCache::get_or_evict) | on hit | evict predicate first, then update |
//! | [`exists_or_evict`](BoundedLruCache::exists_or_evict) | on hit | same side effects as `get_or_evict` |
//! | [`contains_key`](BoundedLruCache::contains_key) | no | pure read |
//! | [`remove`](BoundedLruCache::remove) | - | by key |
//! | [`remove_if`](BoundedLruCache::remove_if) | - | by value predicate, returns count |
//! | [`get_or_insert_with`](BoundedLruCache::get_or_insert_with) | on hit | memoization |
//!
//! ## Performance Characteristics
//!
//! | Operation | Time |
//! |-----------|------|
//! | put / get / exists / remove | O(1) average |
//! | remove_if | O(n) |
//!
//! ## Evict on Read
//!
//! Expiry can be expressed as an eviction predicate, checked under the same
//! lock acquisition as the lookup itself:
//!
//! ```rust
//! use bounded_lru::BoundedLruCache;
//!
//! #[derive(Clone)]
//! struct Timed {
//!     value: &'static str,
//!     expires_at: u64,
//! }
//!
//! let cache = BoundedLruCache::try_new(128).unwrap();
//! cache.put("token", Timed { value: "abc", expires_at: 100 });
//!
//! let now = 50;
//! let hit = cache.get_or_evict("token", |t| t.expires_at = now + 100, |t| t.expires_at <= now);
//! assert_eq!(hit.map(|t| t.value), Some("abc"));
//!
//! let now = 500;
//! let hit = cache.get_or_evict("token", |_| {}, |t| t.expires_at <= now);
//! assert!(hit.is_none());
//! assert!(cache.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`concurrent`]: the thread-safe [`BoundedLruCache`]
//! - [`config`]: construction parameters
//! - [`error`]: construction errors
//! - [`metrics`]: hit/miss/eviction counters

#![no_std]

#[cfg(not(feature = "hashbrown"))]
extern crate std;

/// Arena-backed doubly linked list holding the recency order.
///
/// Internal infrastructure addressed by integer handles.
pub(crate) mod list;

/// The unsynchronized LRU algorithm shared by every public operation.
pub(crate) mod lru;

/// Cache configuration structures.
pub mod config;

/// Construction errors.
pub mod error;

/// Cache metrics system.
///
/// Counters for lookups, hits, insertions and the different kinds of
/// removal, reported in deterministic order.
pub mod metrics;

/// Thread-safe bounded LRU cache.
///
/// A single mutex guards every operation, giving exact LRU order and
/// linearizable operations.
pub mod concurrent;

pub use concurrent::BoundedLruCache;
pub use config::LruCacheConfig;
pub use error::ConfigError;
pub use metrics::{CacheMetrics, LruCacheMetrics};

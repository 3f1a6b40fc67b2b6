//! Cache Configuration Module
//!
//! Construction parameters for [`BoundedLruCache`](crate::BoundedLruCache).
//!
//! The cache is bounded by entry count only. `capacity` is a [`NonZeroUsize`],
//! so a config built directly can never describe an empty cache; use
//! [`LruCacheConfig::try_new`] when the capacity comes from user input.
//!
//! # Examples
//!
//! ```
//! use bounded_lru::config::LruCacheConfig;
//! use bounded_lru::BoundedLruCache;
//! use core::num::NonZeroUsize;
//!
//! let config = LruCacheConfig {
//!     capacity: NonZeroUsize::new(1000).unwrap(),
//! };
//! let cache: BoundedLruCache<String, i32> = BoundedLruCache::init(config, None);
//! assert_eq!(cache.capacity().get(), 1000);
//!
//! // Capacity read from somewhere untrusted
//! assert!(LruCacheConfig::try_new(0).is_err());
//! ```

use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a bounded LRU cache.
///
/// # Fields
///
/// - `capacity`: Maximum number of entries the cache holds. Inserting a new
///   key into a full cache evicts the least recently used entry first.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LruCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
}

impl LruCacheConfig {
    /// Creates a configuration for the given capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }

    /// Creates a configuration from a plain count, rejecting zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(ConfigError::ZeroCapacity)
    }

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

impl fmt::Debug for LruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}

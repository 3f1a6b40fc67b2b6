//! Error types for cache construction.
//!
//! Lookups never fail: a missing key is `None`/`false`. The only error the
//! crate itself produces is an invalid configuration at construction time.
//! Failures raised by caller-supplied callbacks are the caller's own error
//! type and are passed through the `try_*` methods untouched.
//!
//! ```
//! use bounded_lru::error::ConfigError;
//! use bounded_lru::BoundedLruCache;
//!
//! let err = BoundedLruCache::<u32, u32>::try_new(0).unwrap_err();
//! assert_eq!(err, ConfigError::ZeroCapacity);
//! assert!(err.to_string().contains("capacity"));
//! ```

use thiserror::Error;

/// Error returned when cache configuration parameters are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A cache must be able to hold at least one entry.
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
}

//! Cache abstraction layer for Quire.
//!
//! This crate provides generic caching traits that decouple cache consumers
//! from the underlying storage mechanism. Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets (one bucket per namespace)
//! - [`CacheBucket`]: Key-value store with time-to-live expiry
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: In-process implementation, shared between bucket handles
//! - [`FileCache`]: File-based implementation with version validation
//!
//! Expiry is measured against a [`Clock`], so tests can drive time with
//! [`ManualClock`] instead of sleeping.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use quire_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("catalog");
//! bucket.set("blog", b"{}", Some(Duration::from_secs(60)));
//! assert_eq!(bucket.get("blog"), None); // NullCache always misses
//! ```

mod clock;
mod ext;
mod file;
mod memory;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each bucket stores key-value pairs that expire after an optional
/// time-to-live. Expired entries behave exactly like missing ones.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on cache miss or when the entry has expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache.
    ///
    /// Overwrites any existing entry for the same key. A `ttl` of `None`
    /// stores the entry without expiry.
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key (e.g., collection id)
    /// * `value` - Raw bytes to cache
    /// * `ttl` - Time-to-live measured from now
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>);

    /// Remove a single entry. Returns `true` if an entry was removed.
    fn remove(&self, key: &str) -> bool;

    /// Remove every entry in this bucket.
    fn clear(&self);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// A `Cache` produces buckets that are logically isolated from each other.
/// For example, a file-based cache stores each bucket in a separate
/// subdirectory.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name returns handles
    /// that share the same underlying storage.
    ///
    /// # Arguments
    ///
    /// * `name` - Bucket name (e.g., "quire-catalog")
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
///
/// Every `get` returns `None`; every `set` is silently discarded.
/// Used as the bucket type for [`NullCache`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) {}

    fn remove(&self, _key: &str) -> bool {
        false
    }

    fn clear(&self) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled. All operations are no-ops and all lookups
/// return `None`.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

/// Compute the absolute expiry (unix seconds) for a TTL, `0` meaning "never".
pub(crate) fn expires_at(now: i64, ttl: Option<Duration>) -> i64 {
    match ttl {
        Some(ttl) => now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        None => 0,
    }
}

/// Whether an entry with the given expiry is stale at `now`.
pub(crate) fn is_expired(expires_at: i64, now: i64) -> bool {
    expires_at != 0 && now >= expires_at
}

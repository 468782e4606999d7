//! Extension trait for [`CacheBucket`] with typed convenience methods.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// Typed convenience methods for [`CacheBucket`].
///
/// Provides `get_json`/`set_json` for serde-serializable types. These are
/// default methods on an extension trait so that [`CacheBucket`] stays
/// object-safe and implementors only deal with raw bytes.
///
/// # Example
///
/// ```
/// use quire_cache::{Cache, CacheBucketExt, MemoryCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Listing { titles: Vec<String> }
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("catalog");
///
/// bucket.set_json("blog", &Listing { titles: vec!["Hello".into()] }, None);
/// let data: Option<Listing> = bucket.get_json("blog");
/// assert_eq!(data.unwrap().titles, vec!["Hello".to_owned()]);
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value from the cache.
    ///
    /// Returns `None` on cache miss, expiry, or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Store a value as JSON in the cache.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.set(key, &bytes, ttl);
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

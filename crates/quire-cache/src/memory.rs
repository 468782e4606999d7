//! In-process cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::{Cache, CacheBucket, Clock, SystemClock, expires_at, is_expired};

#[derive(Debug)]
struct Entry {
    expires_at: i64,
    value: Vec<u8>,
}

type Buckets = HashMap<String, HashMap<String, Entry>>;

/// Memory-backed [`Cache`].
///
/// All buckets opened from one `MemoryCache` share a single map, so a value
/// written through one handle is visible through another handle with the
/// same bucket name.
pub struct MemoryCache {
    buckets: Arc<RwLock<Buckets>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create an empty cache measuring expiry against the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache measuring expiry against `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            buckets: Arc::clone(&self.buckets),
            clock: Arc::clone(&self.clock),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    buckets: Arc<RwLock<Buckets>>,
    clock: Arc<dyn Clock>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let buckets = self.buckets.read().ok()?;
        let entry = buckets.get(&self.name)?.get(key)?;
        if is_expired(entry.expires_at, now) {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let entry = Entry {
            expires_at: expires_at(self.clock.now(), ttl),
            value: value.to_vec(),
        };
        if let Ok(mut buckets) = self.buckets.write() {
            buckets
                .entry(self.name.clone())
                .or_default()
                .insert(key.to_owned(), entry);
        }
    }

    fn remove(&self, key: &str) -> bool {
        let Ok(mut buckets) = self.buckets.write() else {
            return false;
        };
        buckets
            .get_mut(&self.name)
            .is_some_and(|bucket| bucket.remove(key).is_some())
    }

    fn clear(&self) {
        if let Ok(mut buckets) = self.buckets.write() {
            buckets.remove(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    fn manual_cache(start: i64) -> (Arc<ManualClock>, MemoryCache) {
        let clock = Arc::new(ManualClock::new(start));
        let cache = MemoryCache::with_clock(Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, cache)
    }

    #[test]
    fn test_memory_bucket_set_and_get() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("catalog");

        bucket.set("blog", b"index", None);
        assert_eq!(bucket.get("blog"), Some(b"index".to_vec()));
    }

    #[test]
    fn test_memory_bucket_expires_after_ttl() {
        let (clock, cache) = manual_cache(1_000);
        let bucket = cache.bucket("catalog");

        bucket.set("blog", b"index", Some(Duration::from_secs(60)));

        clock.advance(Duration::from_secs(59));
        assert_eq!(bucket.get("blog"), Some(b"index".to_vec()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(bucket.get("blog"), None);
    }

    #[test]
    fn test_memory_handles_share_storage() {
        let cache = MemoryCache::new();
        cache.bucket("catalog").set("blog", b"shared", None);

        assert_eq!(cache.bucket("catalog").get("blog"), Some(b"shared".to_vec()));
        assert_eq!(cache.bucket("other").get("blog"), None);
    }

    #[test]
    fn test_memory_remove_and_clear() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("catalog");
        let other = cache.bucket("other");

        bucket.set("blog", b"a", None);
        bucket.set("docs", b"b", None);
        other.set("blog", b"c", None);

        assert!(bucket.remove("blog"));
        assert!(!bucket.remove("blog"));
        assert_eq!(bucket.get("docs"), Some(b"b".to_vec()));

        bucket.clear();
        assert_eq!(bucket.get("docs"), None);
        // Other buckets are untouched
        assert_eq!(other.get("blog"), Some(b"c".to_vec()));
    }
}

//! Cached collection indexes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use quire_cache::{Cache, CacheBucket, CacheBucketExt};

use crate::indexer::BuildOutcome;
use crate::record::CollectionIndex;

/// Collection indexes stored in one cache bucket, keyed by collection id.
///
/// Entries that fail to decode are treated as missing.
pub struct IndexCache {
    bucket: Box<dyn CacheBucket>,
    /// One lock per collection, held while that collection is rebuilt.
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IndexCache {
    /// Open the `namespace` bucket of `cache`.
    #[must_use]
    pub fn new(cache: &dyn Cache, namespace: &str) -> Self {
        Self {
            bucket: cache.bucket(namespace),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn get(&self, collection: &str) -> Option<CollectionIndex> {
        self.bucket.get_json(collection)
    }

    pub fn set(&self, collection: &str, index: &CollectionIndex, ttl: Duration) {
        self.bucket.set_json(collection, index, Some(ttl));
    }

    /// Drop one collection's index. Returns `true` if one was stored.
    pub fn remove(&self, collection: &str) -> bool {
        self.bucket.remove(collection)
    }

    /// Drop every stored index.
    pub fn remove_all(&self) {
        self.bucket.clear();
    }

    /// Return the cached index, or build and store it.
    ///
    /// With `ttl` of `None` caching is disabled for this call: the index is
    /// always built and never stored. Concurrent misses on one collection
    /// build once; later callers wait and then read the stored result.
    /// Truncated builds are returned but not stored.
    pub fn get_or_build<F>(
        &self,
        collection: &str,
        ttl: Option<Duration>,
        build: F,
    ) -> CollectionIndex
    where
        F: FnOnce() -> BuildOutcome,
    {
        let Some(ttl) = ttl else {
            tracing::debug!(collection, "Cache disabled, building index");
            return build().index;
        };

        // Fast path
        if let Some(index) = self.get(collection) {
            tracing::debug!(collection, "Index cache hit");
            return index;
        }

        let lock = self.build_lock(collection);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Double-check after acquiring lock
        if let Some(index) = self.get(collection) {
            tracing::debug!(collection, "Index built by another caller");
            return index;
        }

        tracing::debug!(collection, "Index cache miss");
        let outcome = build();
        if outcome.truncated {
            tracing::warn!(collection, "Not caching truncated index");
        } else {
            self.set(collection, &outcome.index, ttl);
        }
        outcome.index
    }

    fn build_lock(&self, collection: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .build_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(collection.to_owned()).or_default())
    }
}

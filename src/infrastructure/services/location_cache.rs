//! Location cache: provider result sets keyed by bucket

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::search::{BucketKey, CachedResultSet, Place};
use crate::domain::store::{KeyValueStore, KeyValueStoreExt};
use crate::domain::Clock;

/// Configuration for the location cache
#[derive(Debug, Clone)]
pub struct LocationCacheConfig {
    /// Namespace prefix for cache keys
    pub namespace: String,
    /// TTL applied to every stored result set
    pub ttl: Duration,
}

impl Default for LocationCacheConfig {
    fn default() -> Self {
        Self {
            namespace: "places".to_string(),
            ttl: Duration::from_secs(3600),
        }
    }
}

impl LocationCacheConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Bucket-keyed result set cache
///
/// Store failures never escape: reads degrade to a miss and writes are
/// dropped with a warning.
#[derive(Debug)]
pub struct LocationCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: LocationCacheConfig,
}

impl LocationCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: LocationCacheConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    fn storage_key(&self, key: &BucketKey) -> String {
        format!("{}:{}", self.config.namespace, key)
    }

    /// Returns the cached set for `key`, if present
    pub async fn get(&self, key: &BucketKey) -> Option<CachedResultSet> {
        let storage_key = self.storage_key(key);

        let result: Result<Option<CachedResultSet>, _> = self.store.get(&storage_key).await;

        match result {
            Ok(Some(cached)) => {
                debug!(key = %storage_key, places = cached.places.len(), "Location cache hit");
                Some(cached)
            }
            Ok(None) => {
                debug!(key = %storage_key, "Location cache miss");
                None
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Location cache read failed, treating as miss");
                None
            }
        }
    }

    /// Overwrites the set stored under `key`
    pub async fn put(&self, key: &BucketKey, places: Vec<Place>) {
        let storage_key = self.storage_key(key);
        let cached = CachedResultSet {
            bucket_key: key.to_string(),
            places,
            cached_at: self.clock.now_millis(),
            ttl_seconds: self.config.ttl.as_secs(),
        };

        if let Err(e) = self.store.set(&storage_key, &cached, self.config.ttl).await {
            warn!(key = %storage_key, error = %e, "Location cache write failed");
        }
    }

    /// Drops whatever is stored under `key`
    pub async fn invalidate(&self, key: &BucketKey) {
        let storage_key = self.storage_key(key);

        if let Err(e) = self.store.delete(&storage_key).await {
            warn!(key = %storage_key, error = %e, "Location cache invalidation failed");
        }
    }
}

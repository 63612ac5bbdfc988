//! Per-client recent search history

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::search::{KeyDeriver, Place, RecentSearchEntry, SearchRequest};
use crate::domain::store::{KeyValueStore, KeyValueStoreExt};
use crate::domain::{Clock, DomainError};

/// Configuration for recent search history
#[derive(Debug, Clone)]
pub struct RecentSearchConfig {
    /// Namespace prefix for history keys
    pub namespace: String,
    /// Entries kept per client
    pub max_entries: usize,
    /// Age beyond which an entry no longer answers a search
    pub freshness: Duration,
    /// Expiry of the stored history list as a whole
    pub storage_ttl: Duration,
}

impl Default for RecentSearchConfig {
    fn default() -> Self {
        Self {
            namespace: "user".to_string(),
            max_entries: 5,
            freshness: Duration::from_secs(3600),
            storage_ttl: Duration::from_secs(86_400),
        }
    }
}

impl RecentSearchConfig {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_storage_ttl(mut self, ttl: Duration) -> Self {
        self.storage_ttl = ttl;
        self
    }
}

/// Bounded newest-first search history per client
#[derive(Debug)]
pub struct RecentSearchCache {
    store: Arc<dyn KeyValueStore>,
    deriver: Arc<KeyDeriver>,
    clock: Arc<dyn Clock>,
    config: RecentSearchConfig,
}

impl RecentSearchCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        deriver: Arc<KeyDeriver>,
        clock: Arc<dyn Clock>,
        config: RecentSearchConfig,
    ) -> Self {
        Self {
            store,
            deriver,
            clock,
            config,
        }
    }

    fn storage_key(&self, client_id: &str) -> String {
        format!("{}:{}:searches", self.config.namespace, client_id)
    }

    async fn load(&self, client_id: &str) -> Result<Vec<RecentSearchEntry>, DomainError> {
        let entries: Option<Vec<RecentSearchEntry>> =
            self.store.get(&self.storage_key(client_id)).await?;
        Ok(entries.unwrap_or_default())
    }

    /// Client's history, newest first; empty if none or unreadable
    pub async fn get_recent(&self, client_id: &str) -> Vec<RecentSearchEntry> {
        match self.load(client_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(client_id, error = %e, "Failed to read recent searches");
                Vec::new()
            }
        }
    }

    /// First fresh entry that is a near-duplicate of `request`
    ///
    /// Categories must match as a set; freshness is judged against the
    /// clock, not against store expiry.
    pub async fn find_match(
        &self,
        client_id: &str,
        request: &SearchRequest,
    ) -> Option<RecentSearchEntry> {
        let now = self.clock.now_millis();
        let freshness_ms = self.config.freshness.as_millis() as i64;
        let categories = self.deriver.canonical_categories(request.categories());

        let found = self.get_recent(client_id).await.into_iter().find(|entry| {
            now - entry.timestamp < freshness_ms
                && self.deriver.is_near_match(&entry.request, request)
                && self.deriver.canonical_categories(entry.request.categories()) == categories
        });

        match &found {
            Some(entry) => debug!(client_id, timestamp = entry.timestamp, "Recent search hit"),
            None => debug!(client_id, "Recent search miss"),
        }

        found
    }

    /// Records a search at the head of the client's history
    ///
    /// Load and store are separate calls, so two concurrent appends for the
    /// same client can drop one of the entries (last write wins).
    pub async fn append(&self, client_id: &str, request: &SearchRequest, results: &[Place]) {
        // An unreadable history is left alone rather than replaced
        let mut entries = match self.load(client_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(client_id, error = %e, "Skipping recent search append, history unreadable");
                return;
            }
        };

        entries.insert(
            0,
            RecentSearchEntry {
                request: request.clone(),
                results: results.to_vec(),
                timestamp: self.clock.now_millis(),
            },
        );
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(self.config.max_entries);

        let key = self.storage_key(client_id);
        if let Err(e) = self.store.set(&key, &entries, self.config.storage_ttl).await {
            warn!(client_id, error = %e, "Failed to store recent searches");
        }
    }
}

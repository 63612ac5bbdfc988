//! In-memory store implementation using moka

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;
use tokio::sync::Mutex;

use crate::domain::store::{KeyValueStore, WindowEvent};
use crate::domain::DomainError;

/// Configuration for in-memory store
#[derive(Debug, Clone)]
pub struct InMemoryStoreConfig {
    /// Maximum number of value entries
    pub max_capacity: u64,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryStoreConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Value entry stored in moka
#[derive(Debug, Clone)]
struct StoredValue {
    data: Arc<str>,
    ttl: Duration,
}

/// Per-entry expiry: every write restarts the entry's own TTL
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Sorted event log backing one rate-limit window
#[derive(Debug, Default)]
struct WindowLog {
    /// (score, member), insertion order
    events: Vec<(i64, String)>,
    expires_at: Option<Instant>,
}

impl WindowLog {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Thread-safe in-memory store
///
/// Values live in moka with per-entry TTLs. Window logs sit behind a
/// single mutex; holding it for the whole batch is what makes
/// `record_window_event` atomic within this process.
#[derive(Debug)]
pub struct InMemoryStore {
    values: MokaCache<String, StoredValue>,
    windows: Mutex<HashMap<String, WindowLog>>,
}

impl InMemoryStore {
    /// Creates a new in-memory store with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryStoreConfig::default())
    }

    pub fn with_config(config: InMemoryStoreConfig) -> Self {
        let values = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            values,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.values.get(key).await.map(|entry| entry.data.to_string()))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let entry = StoredValue {
            data: Arc::from(value),
            ttl,
        };

        self.values.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.values.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.values.contains_key(key))
    }

    async fn record_window_event(&self, event: &WindowEvent) -> Result<u64, DomainError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        // Idle logs are dropped here, the equivalent of key expiry
        windows.retain(|key, log| key == &event.key || !log.is_expired(now));

        let log = windows.entry(event.key.clone()).or_default();

        if log.is_expired(now) {
            log.events.clear();
        }

        log.events.retain(|(score, _)| *score > event.window_start);
        let count = log.events.len() as u64;

        log.events.push((event.score, event.member.clone()));
        log.expires_at = Some(now + event.ttl);

        Ok(count)
    }

    async fn remove_window_event(&self, key: &str, member: &str) -> Result<bool, DomainError> {
        let mut windows = self.windows.lock().await;

        match windows.get_mut(key) {
            Some(log) => {
                let before = log.events.len();
                log.events.retain(|(_, m)| m != member);
                Ok(log.events.len() < before)
            }
            None => Ok(false),
        }
    }
}

//! Key-value store trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// One sliding-window admission attempt against a sorted event log
///
/// Executed by the store as a single indivisible batch: drop every event
/// scored at or below `window_start`, count the survivors, add `member`
/// scored `score`, then refresh the key's expiry to `ttl`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub key: String,
    pub window_start: i64,
    pub score: i64,
    pub member: String,
    pub ttl: Duration,
}

/// Shared key-value store with TTL support
///
/// This trait uses JSON strings internally to be dyn-compatible.
/// Use [`KeyValueStoreExt`] for typed get/set operations.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Gets a raw JSON value from the store
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value with a TTL, replacing any previous value
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a value from the store
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Checks if a key exists in the store
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Runs the atomic window batch, returning the event count observed
    /// after pruning and before inserting the new event
    async fn record_window_event(&self, event: &WindowEvent) -> Result<u64, DomainError>;

    /// Removes a single event from a window log
    async fn remove_window_event(&self, key: &str, member: &str) -> Result<bool, DomainError>;
}

/// Extension trait providing typed get/set operations
pub trait KeyValueStoreExt: KeyValueStore {
    /// Gets a typed value from the store
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cached value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the store with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cached value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing KeyValueStore
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock store for testing
    ///
    /// Expiry is recorded but never enforced; time-dependent behaviour is
    /// driven through the injected clock instead.
    #[derive(Debug, Default)]
    pub struct MockStore {
        entries: Mutex<HashMap<String, (String, Duration)>>,
        windows: Mutex<HashMap<String, Vec<(i64, String)>>>,
        window_ttls: Mutex<HashMap<String, Duration>>,
        error: Mutex<Option<String>>,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry<V: Serialize>(self, key: &str, value: &V, ttl: Duration) -> Self {
            let json = serde_json::to_string(value).unwrap();
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (json, ttl));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.set_error(error);
            self
        }

        /// Makes every subsequent call fail
        pub fn set_error(&self, error: impl Into<String>) {
            *self.error.lock().unwrap() = Some(error.into());
        }

        pub fn clear_error(&self) {
            *self.error.lock().unwrap() = None;
        }

        /// TTL passed on the last write of `key`
        pub fn ttl_of(&self, key: &str) -> Option<Duration> {
            self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
        }

        pub fn window_ttl_of(&self, key: &str) -> Option<Duration> {
            self.window_ttls.lock().unwrap().get(key).copied()
        }

        pub fn window_len(&self, key: &str) -> usize {
            self.windows
                .lock()
                .unwrap()
                .get(key)
                .map(|events| events.len())
                .unwrap_or(0)
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KeyValueStore for MockStore {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.check_error()?;
            let entries = self.entries.lock().unwrap();

            Ok(entries.get(key).map(|(json, _)| json.clone()))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
            self.check_error()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn record_window_event(&self, event: &WindowEvent) -> Result<u64, DomainError> {
            self.check_error()?;
            let mut windows = self.windows.lock().unwrap();
            let events = windows.entry(event.key.clone()).or_default();

            events.retain(|(score, _)| *score > event.window_start);
            let count = events.len() as u64;
            events.push((event.score, event.member.clone()));

            self.window_ttls
                .lock()
                .unwrap()
                .insert(event.key.clone(), event.ttl);

            Ok(count)
        }

        async fn remove_window_event(&self, key: &str, member: &str) -> Result<bool, DomainError> {
            self.check_error()?;
            let mut windows = self.windows.lock().unwrap();

            match windows.get_mut(key) {
                Some(events) => {
                    let before = events.len();
                    events.retain(|(_, m)| m != member);
                    Ok(events.len() < before)
                }
                None => Ok(false),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn event(score: i64, window_start: i64, member: &str) -> WindowEvent {
            WindowEvent {
                key: "rl:test".to_string(),
                window_start,
                score,
                member: member.to_string(),
                ttl: Duration::from_secs(60),
            }
        }

        #[tokio::test]
        async fn test_mock_store_set_get() {
            let store = MockStore::new();
            store
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = store.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
            assert_eq!(store.ttl_of("key1"), Some(Duration::from_secs(60)));
        }

        #[tokio::test]
        async fn test_mock_store_with_error() {
            let store = MockStore::new().with_error("Test error");

            let result: Result<Option<String>, _> = store.get("key").await;
            assert!(result.unwrap_err().is_cache());
        }

        #[tokio::test]
        async fn test_mock_store_window_prunes_and_counts() {
            let store = MockStore::new();

            assert_eq!(store.record_window_event(&event(100, 0, "a")).await.unwrap(), 0);
            assert_eq!(store.record_window_event(&event(200, 0, "b")).await.unwrap(), 1);
            // "a" sits exactly on the boundary and is pruned
            assert_eq!(store.record_window_event(&event(300, 100, "c")).await.unwrap(), 1);
            assert_eq!(store.window_len("rl:test"), 2);

            assert!(store.remove_window_event("rl:test", "c").await.unwrap());
            assert_eq!(store.window_len("rl:test"), 1);
        }
    }
}

//! Redis store implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};

use crate::domain::store::{KeyValueStore, WindowEvent};
use crate::domain::DomainError;

/// Configuration for Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Upper bound on any single store call
    pub operation_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            operation_timeout: Duration::from_millis(500),
        }
    }
}

impl RedisStoreConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Redis store implementation
///
/// Window logs are sorted sets scored by event time; the admission batch
/// runs as one MULTI/EXEC transaction so concurrent checks against the
/// same key observe consistent counts.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    /// Creates a new Redis store connection
    pub async fn new(config: RedisStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Runs a Redis call, mapping errors and timeouts to cache errors
    async fn run<T, F>(&self, op: &str, key: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.config.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DomainError::cache(format!(
                "Failed to {} key '{}': {}",
                op, key, e
            ))),
            Err(_) => Err(DomainError::cache(format!(
                "Timed out trying to {} key '{}'",
                op, key
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        self.run("get", key, conn.get(&prefixed_key)).await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let ttl_secs = ttl.as_secs().max(1);

        self.run("set", key, conn.set_ex(&prefixed_key, value, ttl_secs))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let deleted: i32 = self.run("delete", key, conn.del(&prefixed_key)).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        self.run("check", key, conn.exists(&prefixed_key)).await
    }

    async fn record_window_event(&self, event: &WindowEvent) -> Result<u64, DomainError> {
        let prefixed_key = self.prefix_key(&event.key);
        let mut conn = self.connection.clone();

        let ttl_secs = event.ttl.as_secs().max(1) as i64;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .zrembyscore(&prefixed_key, "-inf", event.window_start)
            .ignore()
            .zcard(&prefixed_key)
            .zadd(&prefixed_key, &event.member, event.score)
            .ignore()
            .expire(&prefixed_key, ttl_secs)
            .ignore();

        let (count,): (u64,) = self
            .run("record window event on", &event.key, pipe.query_async(&mut conn))
            .await?;

        Ok(count)
    }

    async fn remove_window_event(&self, key: &str, member: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let removed: i32 = self
            .run("remove window event from", key, conn.zrem(&prefixed_key, member))
            .await?;

        Ok(removed > 0)
    }
}

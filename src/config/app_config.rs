use std::time::Duration;

use serde::Deserialize;

use crate::domain::rate_limit::{RateLimitConfig, TierConfig};
use crate::domain::search::{KeyDeriver, KeyDeriverConfig, DEFAULT_CATEGORY_SUPERSET};
use crate::domain::DomainError;
use crate::infrastructure::services::{LocationCacheConfig, RecentSearchConfig};
use crate::infrastructure::store::{StoreConfig, StoreType};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreSettings,
    pub search: SearchSettings,
    pub rate_limit: RateLimitSettings,
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Shared key-value store selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// `in_memory` or `redis`
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub max_capacity: u64,
    pub operation_timeout_ms: u64,
}

/// Cache keying and retention
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub location_cache_ttl_seconds: u64,
    pub recent_search_max_entries: usize,
    pub recent_search_ttl_seconds: u64,
    pub geohash_precision: usize,
    pub coordinate_decimals: u32,
    pub radius_rounding_meters: u32,
    pub near_match_threshold_degrees: f64,
    pub default_category_superset: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub ip_limit: u32,
    pub ip_window_seconds: u64,
    pub system_limit: u32,
    pub system_window_seconds: u64,
}

/// Google Places client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_result_count: u32,
    pub language_code: String,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            max_capacity: 10_000,
            operation_timeout_ms: 500,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            location_cache_ttl_seconds: 3600,
            recent_search_max_entries: 5,
            recent_search_ttl_seconds: 86_400,
            geohash_precision: 5,
            coordinate_decimals: 3,
            radius_rounding_meters: 100,
            near_match_threshold_degrees: 0.001,
            default_category_superset: DEFAULT_CATEGORY_SUPERSET
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            ip_limit: 10,
            ip_window_seconds: 300,
            system_limit: 100,
            system_window_seconds: 3600,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://places.googleapis.com/v1".to_string(),
            max_result_count: 20,
            language_code: "en".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Rejects settings the components cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.store_config()?;
        self.rate_limit_config().validate()?;
        KeyDeriver::new(self.key_deriver_config())?;

        let search = &self.search;

        if search.location_cache_ttl_seconds == 0 {
            return Err(DomainError::configuration(
                "search.location_cache_ttl_seconds must be positive",
            ));
        }

        if search.recent_search_max_entries == 0 {
            return Err(DomainError::configuration(
                "search.recent_search_max_entries must be positive",
            ));
        }

        if search.recent_search_ttl_seconds == 0 {
            return Err(DomainError::configuration(
                "search.recent_search_ttl_seconds must be positive",
            ));
        }

        if self.provider.timeout_seconds == 0 {
            return Err(DomainError::configuration(
                "provider.timeout_seconds must be positive",
            ));
        }

        if self.provider.max_result_count == 0 || self.provider.max_result_count > 20 {
            return Err(DomainError::configuration(
                "provider.max_result_count must be between 1 and 20",
            ));
        }

        Ok(())
    }

    pub fn store_config(&self) -> Result<StoreConfig, DomainError> {
        let store_type: StoreType = self.store.backend.parse()?;

        if store_type == StoreType::Redis && self.store.redis_url.is_none() {
            return Err(DomainError::configuration(
                "store.redis_url is required when store.backend is redis",
            ));
        }

        Ok(StoreConfig {
            store_type,
            redis_url: self.store.redis_url.clone(),
            key_prefix: self.store.key_prefix.clone(),
            max_capacity: Some(self.store.max_capacity),
            operation_timeout: Duration::from_millis(self.store.operation_timeout_ms),
        })
    }

    pub fn key_deriver_config(&self) -> KeyDeriverConfig {
        let search = &self.search;

        KeyDeriverConfig {
            coordinate_decimals: search.coordinate_decimals,
            near_match_threshold_degrees: search.near_match_threshold_degrees,
            ..KeyDeriverConfig::default()
        }
        .with_geohash_precision(search.geohash_precision)
        .with_radius_rounding(search.radius_rounding_meters)
        .with_default_categories(&search.default_category_superset)
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        let limits = &self.rate_limit;

        RateLimitConfig::new(
            TierConfig::new(limits.ip_limit, limits.ip_window_seconds),
            TierConfig::new(limits.system_limit, limits.system_window_seconds),
        )
    }

    pub fn location_cache_config(&self) -> LocationCacheConfig {
        LocationCacheConfig::default()
            .with_ttl(Duration::from_secs(self.search.location_cache_ttl_seconds))
    }

    /// Recent-search freshness follows the location cache TTL
    pub fn recent_search_config(&self) -> RecentSearchConfig {
        RecentSearchConfig::default()
            .with_max_entries(self.search.recent_search_max_entries)
            .with_freshness(Duration::from_secs(self.search.location_cache_ttl_seconds))
            .with_storage_ttl(Duration::from_secs(self.search.recent_search_ttl_seconds))
    }

    /// Configured API key, else `GOOGLE_PLACES_API_KEY`
    pub fn provider_api_key(&self) -> Result<String, DomainError> {
        self.provider
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("GOOGLE_PLACES_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(
                    "provider.api_key or GOOGLE_PLACES_API_KEY must be set",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_ok!(config.validate());

        let limits = config.rate_limit_config();
        assert_eq!(limits.per_client, TierConfig::new(10, 300));
        assert_eq!(limits.system, TierConfig::new(100, 3600));

        let recent = config.recent_search_config();
        assert_eq!(recent.max_entries, 5);
        assert_eq!(recent.freshness, Duration::from_secs(3600));
        assert_eq!(recent.storage_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_deserializes_partial_sections() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "rate_limit": {"ip_limit": 3},
            "search": {"default_category_superset": ["Cafe", "bar"]},
            "logging": {"format": "json"}
        }))
        .unwrap();

        assert_eq!(config.rate_limit.ip_limit, 3);
        assert_eq!(config.rate_limit.ip_window_seconds, 300);
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.server.port, 8080);

        let deriver = KeyDeriver::new(config.key_deriver_config()).unwrap();
        assert_eq!(deriver.config().default_categories, vec!["cafe", "bar"]);
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = AppConfig::default();
        config.rate_limit.system_limit = 0;
        assert_err!(config.validate());

        let mut config = AppConfig::default();
        config.search.location_cache_ttl_seconds = 0;
        assert_err!(config.validate());

        let mut config = AppConfig::default();
        config.provider.max_result_count = 50;
        assert_err!(config.validate());

        let mut config = AppConfig::default();
        config.search.geohash_precision = 13;
        assert_err!(config.validate());

        let mut config = AppConfig::default();
        config.search.coordinate_decimals = 400;
        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_redis_backend_needs_url() {
        let mut config = AppConfig::default();
        config.store.backend = "redis".to_string();
        assert_err!(config.validate());

        config.store.redis_url = Some("redis://localhost:6379".to_string());
        let store = config.store_config().unwrap();
        assert_eq!(store.store_type, StoreType::Redis);
    }

    #[test]
    fn test_provider_api_key_from_config() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("configured".to_string());
        assert_eq!(config.provider_api_key().unwrap(), "configured");
    }
}

//! Nearby Places Gateway
//!
//! A caching proxy in front of a places-search provider:
//! - Geo-bucketed result cache shared by all clients
//! - Per-client recent-search history for near-duplicate requests
//! - Two-tier sliding-window rate limiting (per client and process-wide)
//! - In-memory or Redis backing store

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::{Clock, DomainError, KeyDeriver, KeyValueStore, PlacesProvider, SystemClock};
use infrastructure::{
    places::{GooglePlacesConfig, GooglePlacesProvider, HttpClient},
    rate_limit::SlidingWindowRateLimiter,
    services::{LocationCache, RecentSearchCache, SearchService, SearchServiceDeps},
    store::StoreFactory,
};
use tracing::info;

/// Wires the search orchestrator over a store, a provider and a clock
pub fn build_search_service(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
    provider: Arc<dyn PlacesProvider>,
    clock: Arc<dyn Clock>,
) -> Result<SearchService, DomainError> {
    let deriver = Arc::new(KeyDeriver::new(config.key_deriver_config())?);

    let rate_limit = config.rate_limit_config();
    rate_limit.validate()?;

    Ok(SearchService::new(SearchServiceDeps {
        deriver: deriver.clone(),
        location_cache: LocationCache::new(
            store.clone(),
            clock.clone(),
            config.location_cache_config(),
        ),
        recent_searches: RecentSearchCache::new(
            store.clone(),
            deriver,
            clock.clone(),
            config.recent_search_config(),
        ),
        rate_limiter: SlidingWindowRateLimiter::with_clock(store, rate_limit, clock),
        provider,
    }))
}

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store_config = config.store_config()?;
    info!(backend = %store_config.store_type, "Initializing store");
    let store = StoreFactory::new().create(&store_config).await?;

    let settings = &config.provider;
    let http_client = HttpClient::with_timeout(Duration::from_secs(settings.timeout_seconds))?;
    let provider_config = GooglePlacesConfig::new(config.provider_api_key()?)
        .with_base_url(settings.base_url.clone())
        .with_max_result_count(settings.max_result_count)
        .with_language_code(settings.language_code.clone());
    let provider: Arc<dyn PlacesProvider> =
        Arc::new(GooglePlacesProvider::new(http_client, provider_config));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = build_search_service(config, store.clone(), provider, clock)?;

    info!(
        ip_limit = config.rate_limit.ip_limit,
        system_limit = config.rate_limit.system_limit,
        "Search service ready"
    );

    Ok(AppState::new(Arc::new(service), store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_in_memory() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("test-key".to_string());

        let state = create_app_state(&config).await.unwrap();
        assert!(state.store.exists("missing").await.is_ok());
        assert!(state.search_service.recent_searches("127.0.0.1").await.is_empty());
    }

    #[test]
    fn test_build_rejects_invalid_limits() {
        let mut config = AppConfig::default();
        config.rate_limit.ip_limit = 0;

        let store: Arc<dyn KeyValueStore> = Arc::new(domain::store::MockStore::new());
        let provider: Arc<dyn PlacesProvider> =
            Arc::new(domain::search::MockPlacesProvider::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        tokio_test::assert_err!(build_search_service(&config, store, provider, clock));
    }
}

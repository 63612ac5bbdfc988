//! Search orchestration: recent history, location cache, admission, provider

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, instrument};

use super::location_cache::LocationCache;
use super::recent_search::RecentSearchCache;
use crate::domain::search::{
    merge_unique, BucketKey, KeyDeriver, Place, PlacesProvider, RecentSearchEntry, ResolveResult,
    ResultSource, SearchError, SearchRequest,
};
use crate::infrastructure::rate_limit::SlidingWindowRateLimiter;

/// Trait for the search service (for dynamic dispatch in AppState)
#[async_trait]
pub trait SearchServiceTrait: Send + Sync + Debug {
    /// Answers a nearby search for `client_id`
    async fn resolve(
        &self,
        client_id: &str,
        request: &SearchRequest,
    ) -> Result<ResolveResult, SearchError>;

    /// The client's recent searches, newest first
    async fn recent_searches(&self, client_id: &str) -> Vec<RecentSearchEntry>;
}

/// Collaborators of [`SearchService`]
#[derive(Debug)]
pub struct SearchServiceDeps {
    pub deriver: Arc<KeyDeriver>,
    pub location_cache: LocationCache,
    pub recent_searches: RecentSearchCache,
    pub rate_limiter: SlidingWindowRateLimiter,
    pub provider: Arc<dyn PlacesProvider>,
}

/// Search orchestrator
#[derive(Debug)]
pub struct SearchService {
    deriver: Arc<KeyDeriver>,
    location_cache: LocationCache,
    recent_searches: RecentSearchCache,
    rate_limiter: SlidingWindowRateLimiter,
    provider: Arc<dyn PlacesProvider>,
}

impl SearchService {
    pub fn new(deps: SearchServiceDeps) -> Self {
        Self {
            deriver: deps.deriver,
            location_cache: deps.location_cache,
            recent_searches: deps.recent_searches,
            rate_limiter: deps.rate_limiter,
            provider: deps.provider,
        }
    }

    /// Per-category cache lookups, in category order
    async fn lookup(
        &self,
        request: &SearchRequest,
        categories: &[String],
    ) -> Result<(Vec<Vec<Place>>, Vec<(String, BucketKey)>), SearchError> {
        let keys = categories
            .iter()
            .map(|category| {
                self.deriver
                    .derive_category_key(request, category)
                    .map(|key| (category.clone(), key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let lookups = join_all(keys.iter().map(|(_, key)| self.location_cache.get(key))).await;

        let mut hits = Vec::new();
        let mut misses = Vec::new();

        for ((category, key), cached) in keys.into_iter().zip(lookups) {
            match cached {
                Some(cached) => hits.push(cached.places),
                None => misses.push((category, key)),
            }
        }

        Ok((hits, misses))
    }

    /// Fetches every missing category concurrently and backfills the cache
    ///
    /// Results come back in `misses` order regardless of completion order.
    /// Categories that succeeded stay cached even if another one failed.
    async fn fetch_missing(
        &self,
        request: &SearchRequest,
        misses: &[(String, BucketKey)],
    ) -> Result<Vec<Vec<Place>>, SearchError> {
        // Query the bucket's own centre and radius so the cached set matches its key
        let center = self.deriver.round_center(request.center());
        let radius = self.deriver.round_radius(request.radius_meters()) as f64;

        let fetches = misses.iter().map(|(category, key)| async move {
            let result = self
                .provider
                .search(center, radius, std::slice::from_ref(category))
                .await;

            match &result {
                Ok(places) if places.is_empty() => self.location_cache.invalidate(key).await,
                Ok(places) => self.location_cache.put(key, places.clone()).await,
                Err(_) => {}
            }

            (category, result)
        });

        let mut fetched = Vec::with_capacity(misses.len());

        for (category, result) in join_all(fetches).await {
            match result {
                Ok(places) => {
                    debug!(category = %category, places = places.len(), "Fetched from provider");
                    fetched.push(places);
                }
                Err(e) => {
                    error!(
                        category = %category,
                        provider = self.provider.provider_name(),
                        error = %e,
                        "Provider search failed"
                    );
                    return Err(e.into());
                }
            }
        }

        Ok(fetched)
    }
}

#[async_trait]
impl SearchServiceTrait for SearchService {
    #[instrument(skip(self, request))]
    async fn resolve(
        &self,
        client_id: &str,
        request: &SearchRequest,
    ) -> Result<ResolveResult, SearchError> {
        request.validate()?;

        if let Some(entry) = self.recent_searches.find_match(client_id, request).await {
            debug!(source = %ResultSource::RecentCache, "Resolved search");
            return Ok(ResolveResult::cached(entry.results, ResultSource::RecentCache));
        }

        let categories = self.deriver.resolve_categories(request.categories());
        let (hits, misses) = self.lookup(request, &categories).await?;

        if misses.is_empty() {
            let results = merge_unique(hits);
            self.recent_searches.append(client_id, request, &results).await;

            debug!(source = %ResultSource::LocationCache, "Resolved search");
            return Ok(ResolveResult::cached(results, ResultSource::LocationCache));
        }

        let decision = self.rate_limiter.check_limit(client_id).await;
        if !decision.admitted {
            return Err(SearchError::RateLimited(decision));
        }

        let fetched = self.fetch_missing(request, &misses).await?;

        let source = if hits.is_empty() {
            ResultSource::Provider
        } else {
            ResultSource::Mixed
        };

        let results = merge_unique(hits.into_iter().chain(fetched));
        self.recent_searches.append(client_id, request, &results).await;

        debug!(
            source = %source,
            missing = misses.len(),
            results = results.len(),
            "Resolved search"
        );

        Ok(ResolveResult::fetched(results, source, decision))
    }

    async fn recent_searches(&self, client_id: &str) -> Vec<RecentSearchEntry> {
        self.recent_searches.get_recent(client_id).await
    }
}

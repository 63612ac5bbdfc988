//! Infrastructure services

mod location_cache;
mod recent_search;
mod search_service;

pub use location_cache::{LocationCache, LocationCacheConfig};
pub use recent_search::{RecentSearchCache, RecentSearchConfig};
pub use search_service::{SearchService, SearchServiceDeps, SearchServiceTrait};

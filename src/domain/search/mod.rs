//! Search domain - Requests, bucket keys, places and the provider port

mod error;
mod key;
mod place;
mod provider;
mod request;
mod result;

pub use error::SearchError;
pub use key::{BucketKey, KeyDeriver, KeyDeriverConfig, DEFAULT_CATEGORY_SUPERSET};
pub use place::{merge_unique, CachedResultSet, Place, RecentSearchEntry};
pub use provider::PlacesProvider;
pub use request::{normalize_categories, GeoPoint, SearchRequest};
pub use result::{ResolveResult, ResultSource};

#[cfg(test)]
pub use place::test_place;
#[cfg(test)]
pub use provider::mock::MockPlacesProvider;

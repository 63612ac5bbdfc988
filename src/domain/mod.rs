//! Domain layer - Core search policy, types and ports

pub mod clock;
pub mod error;
pub mod rate_limit;
pub mod search;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use error::DomainError;
pub use rate_limit::{RateLimitConfig, RateLimitDecision, RateLimitReason, TierConfig};
pub use search::{
    BucketKey, CachedResultSet, GeoPoint, KeyDeriver, KeyDeriverConfig, PlacesProvider, Place,
    RecentSearchEntry, ResolveResult, ResultSource, SearchError, SearchRequest,
};
pub use store::{KeyValueStore, KeyValueStoreExt, WindowEvent};

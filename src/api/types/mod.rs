//! API request, response and error types

pub mod error;
pub mod json;
pub mod search;

pub use error::{insert_rate_limit_headers, ApiError, ApiErrorResponse, RateLimitInfo};
pub use json::Json;
pub use search::{RecentSearchItem, RecentSearchesResponse, SearchBody, SearchResponse};

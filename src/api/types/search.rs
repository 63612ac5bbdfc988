//! Search request and response bodies

use serde::{Deserialize, Serialize};

use super::error::RateLimitInfo;
use crate::domain::{
    GeoPoint, Place, RecentSearchEntry, ResolveResult, ResultSource, SearchError, SearchRequest,
};

/// POST /v1/search body
#[derive(Debug, Clone, Deserialize)]
pub struct SearchBody {
    pub location: GeoPoint,
    /// Meters
    pub radius: f64,
    #[serde(default, alias = "cuisines")]
    pub categories: Vec<String>,
}

impl SearchBody {
    pub fn into_request(self) -> Result<SearchRequest, SearchError> {
        SearchRequest::new(self.location, self.radius, self.categories)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub data: Vec<Place>,
    pub source: ResultSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

impl From<ResolveResult> for SearchResponse {
    fn from(result: ResolveResult) -> Self {
        Self {
            data: result.results,
            source: result.source,
            rate_limit: result.rate_limit.map(RateLimitInfo::from),
        }
    }
}

/// One entry of GET /v1/search/recent
#[derive(Debug, Clone, Serialize)]
pub struct RecentSearchItem {
    pub location: GeoPoint,
    pub radius: f64,
    pub categories: Vec<String>,
    pub results: Vec<Place>,
    /// Millis since epoch
    pub timestamp: i64,
}

impl From<RecentSearchEntry> for RecentSearchItem {
    fn from(entry: RecentSearchEntry) -> Self {
        Self {
            location: entry.request.center(),
            radius: entry.request.radius_meters(),
            categories: entry.request.categories().to_vec(),
            results: entry.results,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSearchesResponse {
    pub data: Vec<RecentSearchItem>,
}

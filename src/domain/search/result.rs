//! Resolve outcomes

use serde::{Deserialize, Serialize};

use super::place::Place;
use crate::domain::rate_limit::RateLimitDecision;

/// Where the returned places came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    RecentCache,
    LocationCache,
    Provider,
    Mixed,
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecentCache => write!(f, "recent_cache"),
            Self::LocationCache => write!(f, "location_cache"),
            Self::Provider => write!(f, "provider"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// Successful resolve
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveResult {
    pub results: Vec<Place>,
    pub source: ResultSource,
    /// Present when the request went through admission control
    pub rate_limit: Option<RateLimitDecision>,
}

impl ResolveResult {
    pub fn cached(results: Vec<Place>, source: ResultSource) -> Self {
        Self {
            results,
            source,
            rate_limit: None,
        }
    }

    pub fn fetched(results: Vec<Place>, source: ResultSource, decision: RateLimitDecision) -> Self {
        Self {
            results,
            source,
            rate_limit: Some(decision),
        }
    }

    /// True when the limiter admitted this request without enforcement
    pub fn is_degraded(&self) -> bool {
        self.rate_limit.is_some_and(|d| d.is_degraded())
    }
}

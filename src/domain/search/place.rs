//! Normalized place records and cached result sets

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::request::SearchRequest;

/// A place as served to clients and stored in caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: String,
    /// 0 (unknown/free) to 4 (very expensive)
    pub price_tier: u8,
    pub rating: f64,
    pub address: String,
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}

impl Place {
    /// Price tier rendered as a run of `$` signs
    pub fn price_label(&self) -> String {
        "$".repeat(self.price_tier as usize)
    }
}

/// Concatenates place lists, keeping only the first occurrence of each id
pub fn merge_unique<I>(lists: I) -> Vec<Place>
where
    I: IntoIterator<Item = Vec<Place>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for place in lists.into_iter().flatten() {
        if seen.insert(place.id.clone()) {
            merged.push(place);
        }
    }

    merged
}

/// Provider results stored under one bucket key
///
/// Never patched: a refresh overwrites the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResultSet {
    pub bucket_key: String,
    pub places: Vec<Place>,
    /// Insertion time, millis since epoch
    pub cached_at: i64,
    pub ttl_seconds: u64,
}

/// One remembered search of a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub request: SearchRequest,
    pub results: Vec<Place>,
    /// Millis since epoch
    pub timestamp: i64,
}

#[cfg(test)]
pub fn test_place(id: &str, category: &str) -> Place {
    Place {
        id: id.to_string(),
        name: format!("Place {}", id),
        category: category.to_string(),
        price_tier: 2,
        rating: 4.2,
        address: "1 Test Street".to_string(),
        review_count: 10,
        photos: Vec::new(),
    }
}

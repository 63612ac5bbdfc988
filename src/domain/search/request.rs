//! Search request value types

use serde::{Deserialize, Serialize};

use super::error::SearchError;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// An immutable "places near me" request
///
/// Categories keep the order the caller gave them (minus blanks and
/// duplicates) so that downstream merging is reproducible. An empty list
/// means "the default category superset". Deserialization goes through
/// [`SearchRequest::new`], so stored or decoded requests are normalized too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchRequest")]
pub struct SearchRequest {
    center: GeoPoint,
    radius_meters: f64,
    categories: Vec<String>,
}

/// Wire shape of a [`SearchRequest`] before validation
#[derive(Deserialize)]
struct RawSearchRequest {
    center: GeoPoint,
    radius_meters: f64,
    #[serde(default)]
    categories: Vec<String>,
}

impl TryFrom<RawSearchRequest> for SearchRequest {
    type Error = SearchError;

    fn try_from(raw: RawSearchRequest) -> Result<Self, Self::Error> {
        Self::new(raw.center, raw.radius_meters, raw.categories)
    }
}

impl SearchRequest {
    /// Builds and validates a request
    pub fn new<I, S>(center: GeoPoint, radius_meters: f64, categories: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let request = Self {
            center,
            radius_meters,
            categories: normalize_categories(categories),
        };

        request.validate()?;
        Ok(request)
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Rejects non-positive radii and malformed coordinates
    pub fn validate(&self) -> Result<(), SearchError> {
        let GeoPoint { lat, lng } = self.center;

        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SearchError::invalid_request(format!(
                "latitude must be between -90 and 90, got {}",
                lat
            )));
        }

        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(SearchError::invalid_request(format!(
                "longitude must be between -180 and 180, got {}",
                lng
            )));
        }

        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(SearchError::invalid_request(format!(
                "radius must be a positive number of meters, got {}",
                self.radius_meters
            )));
        }

        Ok(())
    }
}

/// Trims, lowercases and de-duplicates category names, keeping first occurrences
pub fn normalize_categories<I, S>(categories: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();

    for category in categories {
        let category = category.as_ref().trim().to_lowercase();

        if !category.is_empty() && !normalized.contains(&category) {
            normalized.push(category);
        }
    }

    normalized
}

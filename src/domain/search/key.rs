//! Bucket key derivation
//!
//! Nearby, similar requests are folded onto the same cache key: the
//! centre is rounded to a fixed decimal grid and geohashed, the radius
//! is rounded to a fixed step, and the category set is sorted.

use std::fmt;

use geohash::Coord;

use super::error::SearchError;
use super::request::{normalize_categories, GeoPoint, SearchRequest};
use crate::domain::DomainError;

/// Default broad food-related categories searched when a request names none
pub const DEFAULT_CATEGORY_SUPERSET: &[&str] =
    &["restaurant", "cafe", "bakery", "bar", "meal_takeaway"];

/// Tuning knobs for key derivation
#[derive(Debug, Clone)]
pub struct KeyDeriverConfig {
    /// Decimal places kept when rounding coordinates (3 ≈ 110 m grid)
    pub coordinate_decimals: u32,
    /// Geohash length of the bucket cell (5 ≈ 4.9 km × 4.9 km)
    pub geohash_precision: usize,
    /// Radius rounding step in meters
    pub radius_rounding_meters: u32,
    /// Max per-axis delta, in degrees, for two centres to count as near
    pub near_match_threshold_degrees: f64,
    /// Categories substituted for an empty category list
    pub default_categories: Vec<String>,
}

impl Default for KeyDeriverConfig {
    fn default() -> Self {
        Self {
            coordinate_decimals: 3,
            geohash_precision: 5,
            radius_rounding_meters: 100,
            near_match_threshold_degrees: 0.001,
            default_categories: DEFAULT_CATEGORY_SUPERSET
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl KeyDeriverConfig {
    pub fn with_geohash_precision(mut self, precision: usize) -> Self {
        self.geohash_precision = precision;
        self
    }

    pub fn with_radius_rounding(mut self, meters: u32) -> Self {
        self.radius_rounding_meters = meters;
        self
    }

    pub fn with_default_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.default_categories = normalize_categories(categories);
        self
    }
}

/// Coarse-grained cache key: `geohash:radius:categories`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    geohash: String,
    radius: u32,
    categories: String,
    rendered: String,
}

impl BucketKey {
    fn new(geohash: String, radius: u32, categories: String) -> Self {
        let rendered = format!("{}:{}:{}", geohash, radius, categories);
        Self {
            geohash,
            radius,
            categories,
            rendered,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn geohash(&self) -> &str {
        &self.geohash
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn categories(&self) -> &str {
        &self.categories
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Upper bound on `coordinate_decimals`
const MAX_COORDINATE_DECIMALS: u32 = 10;

/// Derives bucket keys and near-duplicate matches from requests
///
/// Derivation is a pure function of the request and this configuration.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    config: KeyDeriverConfig,
}

impl KeyDeriver {
    pub fn new(config: KeyDeriverConfig) -> Result<Self, DomainError> {
        if !(1..=12).contains(&config.geohash_precision) {
            return Err(DomainError::configuration(format!(
                "geohash precision must be between 1 and 12, got {}",
                config.geohash_precision
            )));
        }

        if config.coordinate_decimals > MAX_COORDINATE_DECIMALS {
            return Err(DomainError::configuration(format!(
                "coordinate decimals must be at most {}, got {}",
                MAX_COORDINATE_DECIMALS, config.coordinate_decimals
            )));
        }

        if config.radius_rounding_meters == 0 {
            return Err(DomainError::configuration(
                "radius rounding step must be positive",
            ));
        }

        if config.default_categories.is_empty() {
            return Err(DomainError::configuration(
                "default category superset must not be empty",
            ));
        }

        let threshold = config.near_match_threshold_degrees;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(DomainError::configuration(
                "near-match threshold must be positive",
            ));
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &KeyDeriverConfig {
        &self.config
    }

    /// Derives the bucket key for a request
    pub fn derive_bucket_key(&self, request: &SearchRequest) -> Result<BucketKey, SearchError> {
        let center = self.round_center(request.center());

        let geohash = geohash::encode(
            Coord {
                x: center.lng,
                y: center.lat,
            },
            self.config.geohash_precision,
        )
        .map_err(|e| SearchError::invalid_request(format!("cannot geohash centre: {}", e)))?;

        Ok(BucketKey::new(
            geohash,
            self.round_radius(request.radius_meters()),
            self.canonical_categories(request.categories()),
        ))
    }

    /// Bucket key for a single category of a request
    pub fn derive_category_key(
        &self,
        request: &SearchRequest,
        category: &str,
    ) -> Result<BucketKey, SearchError> {
        let single = SearchRequest::new(request.center(), request.radius_meters(), [category])?;
        self.derive_bucket_key(&single)
    }

    /// Categories to search, in stable order: the request's own, or the default superset
    pub fn resolve_categories(&self, categories: &[String]) -> Vec<String> {
        if categories.is_empty() {
            self.config.default_categories.clone()
        } else {
            categories.to_vec()
        }
    }

    /// Sorted, comma-joined category set; empty resolves to the default superset
    pub fn canonical_categories(&self, categories: &[String]) -> String {
        let mut sorted = self.resolve_categories(categories);
        sorted.sort();
        sorted.dedup();
        sorted.join(",")
    }

    pub fn round_coordinate(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.config.coordinate_decimals as i32);
        (value * factor).round() / factor
    }

    pub fn round_center(&self, center: GeoPoint) -> GeoPoint {
        GeoPoint::new(
            self.round_coordinate(center.lat),
            self.round_coordinate(center.lng),
        )
    }

    /// Nearest multiple of the rounding step, never below one step
    pub fn round_radius(&self, radius_meters: f64) -> u32 {
        let step = self.config.radius_rounding_meters as f64;
        let rounded = (radius_meters / step).round() * step;
        rounded.max(step) as u32
    }

    /// Near-duplicate test between a stored and a requested search
    ///
    /// True iff both coordinate deltas are under the threshold and the
    /// radii round to the same value. Independent of geohash cell edges.
    pub fn is_near_match(&self, stored: &SearchRequest, requested: &SearchRequest) -> bool {
        let threshold = self.config.near_match_threshold_degrees;
        let a = stored.center();
        let b = requested.center();

        (a.lat - b.lat).abs() < threshold
            && (a.lng - b.lng).abs() < threshold
            && self.round_radius(stored.radius_meters()) == self.round_radius(requested.radius_meters())
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self {
            config: KeyDeriverConfig::default(),
        }
    }
}

use async_trait::async_trait;
use std::fmt::Debug;

use super::place::Place;
use super::request::GeoPoint;
use crate::domain::DomainError;

/// Trait for external nearby-search providers
#[async_trait]
pub trait PlacesProvider: Send + Sync + Debug {
    /// Searches for places of the given categories around `center`
    async fn search(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        categories: &[String],
    ) -> Result<Vec<Place>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

//! Google Places (New) nearby search provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::http_client::HttpClientTrait;
use crate::domain::search::{GeoPoint, Place, PlacesProvider};
use crate::domain::DomainError;

const DEFAULT_GOOGLE_PLACES_BASE_URL: &str = "https://places.googleapis.com/v1";

const FIELD_MASK: &str = "places.id,places.displayName,places.priceLevel,places.rating,\
places.userRatingCount,places.types,places.primaryType,places.formattedAddress,places.photos";

const PHOTO_MAX_WIDTH_PX: u32 = 400;

/// Request settings for the Google Places provider
#[derive(Debug, Clone)]
pub struct GooglePlacesConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_result_count: u32,
    pub language_code: String,
}

impl GooglePlacesConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GOOGLE_PLACES_BASE_URL.to_string(),
            max_result_count: 20,
            language_code: "en".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_result_count(mut self, count: u32) -> Self {
        self.max_result_count = count;
        self
    }

    pub fn with_language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }
}

/// Google Places API provider
#[derive(Debug)]
pub struct GooglePlacesProvider<C: HttpClientTrait> {
    client: C,
    config: GooglePlacesConfig,
}

impl<C: HttpClientTrait> GooglePlacesProvider<C> {
    pub fn new(client: C, config: GooglePlacesConfig) -> Self {
        Self { client, config }
    }

    fn search_nearby_url(&self) -> String {
        format!("{}/places:searchNearby", self.config.base_url)
    }

    fn build_request(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        categories: &[String],
    ) -> serde_json::Value {
        serde_json::json!({
            "locationRestriction": {
                "circle": {
                    "center": {
                        "latitude": center.lat,
                        "longitude": center.lng,
                    },
                    "radius": radius_meters,
                }
            },
            "includedTypes": categories,
            "maxResultCount": self.config.max_result_count,
            "languageCode": self.config.language_code,
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Content-Type", "application/json"),
            ("X-Goog-Api-Key", self.config.api_key.as_str()),
            ("X-Goog-FieldMask", FIELD_MASK),
        ]
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        categories: &[String],
    ) -> Result<Vec<Place>, DomainError> {
        let response: GoogleSearchNearbyResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("google_places", format!("Failed to parse response: {}", e))
        })?;

        let fallback = categories.first().map(String::as_str).unwrap_or_default();

        Ok(response
            .places
            .unwrap_or_default()
            .into_iter()
            .map(|place| map_google_place(place, fallback, &self.config.base_url))
            .collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> PlacesProvider for GooglePlacesProvider<C> {
    async fn search(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        categories: &[String],
    ) -> Result<Vec<Place>, DomainError> {
        let body = self.build_request(center, radius_meters, categories);

        debug!(
            lat = center.lat,
            lng = center.lng,
            radius_meters,
            categories = ?categories,
            "Calling Google Places nearby search"
        );

        let json = self
            .client
            .post_json(&self.search_nearby_url(), self.headers(), &body)
            .await
            .map_err(|e| {
                error!(error = %e, "Google Places request failed");
                match e {
                    DomainError::Provider { message, .. } => {
                        DomainError::provider("google_places", message)
                    }
                    other => other,
                }
            })?;

        self.parse_response(json, categories)
    }

    fn provider_name(&self) -> &'static str {
        "google_places"
    }
}

#[derive(Debug, Default, Deserialize)]
struct GoogleSearchNearbyResponse {
    places: Option<Vec<GooglePlace>>,
}

/// A place as returned by the searchNearby endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePlace {
    pub id: String,
    pub display_name: Option<GoogleLocalizedText>,
    pub price_level: Option<GooglePriceLevel>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    pub primary_type: Option<String>,
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub photos: Vec<GooglePhoto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleLocalizedText {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePhoto {
    pub name: String,
}

/// Price level, sent either as an ordinal or as a `PRICE_LEVEL_*` name
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GooglePriceLevel {
    Numeric(u8),
    Named(String),
}

impl GooglePriceLevel {
    /// Tier in 0..=4; unrecognised names count as unknown (0)
    pub fn tier(&self) -> u8 {
        match self {
            Self::Numeric(level) => (*level).min(4),
            Self::Named(name) => match name.as_str() {
                "PRICE_LEVEL_INEXPENSIVE" => 1,
                "PRICE_LEVEL_MODERATE" => 2,
                "PRICE_LEVEL_EXPENSIVE" => 3,
                "PRICE_LEVEL_VERY_EXPENSIVE" => 4,
                _ => 0,
            },
        }
    }
}

/// Maps a provider place to the normalized shape
///
/// Missing rating and review count become 0. The category is the primary
/// type, else the first listed type, else `fallback_category`.
///
/// Photo URLs point at the Places media endpoint without an API key.
/// Callers must append `key=...` themselves or serve them through a proxy
/// that adds the key; they are not directly fetchable by end clients.
pub fn map_google_place(place: GooglePlace, fallback_category: &str, base_url: &str) -> Place {
    let category = place
        .primary_type
        .or_else(|| place.types.into_iter().next())
        .unwrap_or_else(|| fallback_category.to_string());

    let photos = place
        .photos
        .iter()
        .map(|photo| {
            format!(
                "{}/{}/media?maxWidthPx={}",
                base_url, photo.name, PHOTO_MAX_WIDTH_PX
            )
        })
        .collect();

    Place {
        id: place.id,
        name: place.display_name.map(|n| n.text).unwrap_or_default(),
        category,
        price_tier: place.price_level.map(|p| p.tier()).unwrap_or(0),
        rating: place.rating.unwrap_or(0.0),
        address: place.formatted_address.unwrap_or_default(),
        review_count: place.user_rating_count.unwrap_or(0),
        photos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::places::http_client::mock::MockHttpClient;
    use crate::infrastructure::places::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://places.googleapis.com/v1/places:searchNearby";

    fn sample_response() -> serde_json::Value {
        json!({
            "places": [
                {
                    "id": "p1",
                    "displayName": {"text": "Sushi Zen", "languageCode": "en"},
                    "priceLevel": "PRICE_LEVEL_EXPENSIVE",
                    "rating": 4.6,
                    "userRatingCount": 321,
                    "types": ["sushi_restaurant", "restaurant"],
                    "primaryType": "sushi_restaurant",
                    "formattedAddress": "1 Orchard Rd",
                    "photos": [{"name": "places/p1/photos/abc", "widthPx": 800, "heightPx": 600}]
                },
                {
                    "id": "p2",
                    "displayName": {"text": "Corner Stall"},
                    "types": ["food"]
                }
            ]
        })
    }

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_search_maps_places() {
        let client = MockHttpClient::new().with_response(URL, sample_response());
        let provider = GooglePlacesProvider::new(client, GooglePlacesConfig::new("key"));

        let places = provider
            .search(
                GeoPoint::new(1.3, 103.8),
                1000.0,
                &categories(&["sushi_restaurant"]),
            )
            .await
            .unwrap();

        assert_eq!(places.len(), 2);

        let first = &places[0];
        assert_eq!(first.name, "Sushi Zen");
        assert_eq!(first.category, "sushi_restaurant");
        assert_eq!(first.price_tier, 3);
        assert_eq!(first.price_label(), "$$$");
        assert_eq!(first.review_count, 321);
        assert_eq!(
            first.photos,
            vec!["https://places.googleapis.com/v1/places/p1/photos/abc/media?maxWidthPx=400"]
        );

        let second = &places[1];
        assert_eq!(second.category, "food");
        assert_eq!(second.rating, 0.0);
        assert_eq!(second.review_count, 0);
        assert_eq!(second.price_tier, 0);
        assert_eq!(second.address, "");
    }

    #[tokio::test]
    async fn test_photo_urls_carry_no_api_key() {
        let client = MockHttpClient::new().with_response(URL, sample_response());
        let provider = GooglePlacesProvider::new(client, GooglePlacesConfig::new("secret"));

        let places = provider
            .search(GeoPoint::new(1.3, 103.8), 1000.0, &categories(&["sushi_restaurant"]))
            .await
            .unwrap();

        let photos: Vec<&String> = places.iter().flat_map(|p| &p.photos).collect();
        assert!(!photos.is_empty());
        assert!(photos.iter().all(|url| !url.contains("secret") && !url.contains("key=")));
    }

    #[tokio::test]
    async fn test_search_builds_request() {
        let client = MockHttpClient::new().with_response(URL, json!({}));
        let config = GooglePlacesConfig::new("secret")
            .with_max_result_count(10)
            .with_language_code("ja");
        let provider = GooglePlacesProvider::new(client, config);

        provider
            .search(GeoPoint::new(1.3, 103.8), 500.0, &categories(&["cafe"]))
            .await
            .unwrap();

        let requests = provider.client.requests();
        assert_eq!(requests.len(), 1);

        let body = &requests[0].body;
        assert_eq!(body["locationRestriction"]["circle"]["center"]["latitude"], 1.3);
        assert_eq!(body["locationRestriction"]["circle"]["radius"], 500.0);
        assert_eq!(body["includedTypes"], json!(["cafe"]));
        assert_eq!(body["maxResultCount"], 10);
        assert_eq!(body["languageCode"], "ja");

        let headers = &requests[0].headers;
        assert!(headers.contains(&("X-Goog-Api-Key".to_string(), "secret".to_string())));
        assert!(headers.iter().any(|(k, v)| k == "X-Goog-FieldMask" && v.contains("places.id")));
    }

    #[tokio::test]
    async fn test_missing_places_is_empty() {
        let client = MockHttpClient::new().with_response(URL, json!({"places": null}));
        let provider = GooglePlacesProvider::new(client, GooglePlacesConfig::new("key"));

        let places = provider
            .search(GeoPoint::new(0.0, 0.0), 100.0, &categories(&["bar"]))
            .await
            .unwrap();
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_provider_error() {
        let client = MockHttpClient::new().with_error(URL, "connection reset");
        let provider = GooglePlacesProvider::new(client, GooglePlacesConfig::new("key"));

        let err = provider
            .search(GeoPoint::new(0.0, 0.0), 100.0, &categories(&["bar"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Provider { ref provider, .. } if provider == "google_places"));
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/places:searchNearby"))
            .and(header("X-Goog-Api-Key", "live-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(1)
            .mount(&server)
            .await;

        let config =
            GooglePlacesConfig::new("live-key").with_base_url(format!("{}/v1/", server.uri()));
        let provider = GooglePlacesProvider::new(HttpClient::new(), config);

        let places = provider
            .search(GeoPoint::new(1.3, 103.8), 1000.0, &categories(&["sushi_restaurant"]))
            .await
            .unwrap();

        assert_eq!(places.len(), 2);
        assert!(places[0].photos[0].starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let config = GooglePlacesConfig::new("bad").with_base_url(server.uri());
        let provider = GooglePlacesProvider::new(HttpClient::new(), config);

        let err = provider
            .search(GeoPoint::new(1.3, 103.8), 1000.0, &categories(&["cafe"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_map_category_fallbacks() {
        let place = GooglePlace {
            id: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(map_google_place(place, "bakery", "").category, "bakery");

        let place = GooglePlace {
            id: "x".to_string(),
            types: vec!["cafe".to_string(), "store".to_string()],
            primary_type: Some("coffee_shop".to_string()),
            ..Default::default()
        };
        assert_eq!(map_google_place(place, "bakery", "").category, "coffee_shop");
    }

    #[test]
    fn test_price_level_tiers() {
        assert_eq!(GooglePriceLevel::Numeric(2).tier(), 2);
        assert_eq!(GooglePriceLevel::Numeric(9).tier(), 4);
        assert_eq!(GooglePriceLevel::Named("PRICE_LEVEL_FREE".into()).tier(), 0);
        assert_eq!(GooglePriceLevel::Named("PRICE_LEVEL_VERY_EXPENSIVE".into()).tier(), 4);
        assert_eq!(GooglePriceLevel::Named("PRICE_LEVEL_UNSPECIFIED".into()).tier(), 0);

        let parsed: GooglePlace =
            serde_json::from_value(json!({"id": "a", "priceLevel": 3})).unwrap();
        assert_eq!(parsed.price_level, Some(GooglePriceLevel::Numeric(3)));
    }
}

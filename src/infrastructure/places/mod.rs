//! Places provider implementations

mod google;
mod http_client;

pub use google::{
    map_google_place, GoogleLocalizedText, GooglePhoto, GooglePlace, GooglePlacesConfig,
    GooglePlacesProvider, GooglePriceLevel,
};
pub use http_client::{HttpClient, HttpClientTrait};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;

//! Google Geocoding API, the primary geocoder.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{GeocodeOutcome, Geocoder};
use crate::error::ProviderError;
use crate::pipeline::types::GeoPoint;

const PROVIDER: &str = "google_geocoding";
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: GeoPoint,
}

/// Whether a result's address components place it in the US.
pub fn is_us(components: &[AddressComponent]) -> bool {
    components.iter().any(|c| {
        c.long_name == "United States"
            || (c.short_name == "US" && c.types.iter().any(|t| t == "country"))
    })
}

/// Turn a decoded response into a chain outcome.
///
/// Only the top result is considered.
pub fn interpret(response: GeocodeResponse) -> Result<GeocodeOutcome, ProviderError> {
    match response.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => {}
        Some(status) => {
            return Err(ProviderError::Api {
                provider: PROVIDER.to_string(),
                status: 200,
                message: format!(
                    "{status}: {}",
                    response.error_message.unwrap_or_default()
                ),
            });
        }
    }

    let Some(top) = response.results.and_then(|r| r.into_iter().next()) else {
        return Ok(GeocodeOutcome::NoResults);
    };

    if !is_us(&top.address_components) {
        debug!(components = ?top.address_components, "Google result is not in the US");
        return Ok(GeocodeOutcome::NotUs);
    }

    Ok(top
        .geometry
        .map(|g| GeocodeOutcome::Found(g.location))
        .unwrap_or(GeocodeOutcome::NoResults))
}

pub struct GoogleGeocoder {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleGeocoder {
    pub fn new(api_key: SecretString, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self) -> String {
        format!("{}/maps/api/geocode/json", self.base_url)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn name(&self) -> &str {
        "google"
    }

    async fn geocode(&self, query: &str) -> Result<GeocodeOutcome, ProviderError> {
        let resp = self
            .client
            .get(self.api_url())
            .query(&[("address", query), ("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: GeocodeResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e))?;

        interpret(body)
    }
}

//! MapQuest Geocoding API, the secondary geocoder.
//!
//! ZIP and ZIP+4 queries go out as a structured postal-code lookup, which
//! MapQuest resolves more reliably than the same digits as free text.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{GeocodeOutcome, Geocoder, looks_like_postal_code};
use crate::error::ProviderError;
use crate::pipeline::types::GeoPoint;

const PROVIDER: &str = "mapquest";
pub const DEFAULT_BASE_URL: &str = "https://www.mapquestapi.com";

#[derive(Debug, Default, Deserialize)]
pub struct MapQuestResponse {
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub results: Option<Vec<MapQuestResult>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub statuscode: i64,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapQuestResult {
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Country code, e.g. `"US"`.
    #[serde(default)]
    pub admin_area1: Option<String>,
    #[serde(default)]
    pub lat_lng: Option<GeoPoint>,
}

/// How the query is sent to MapQuest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKind<'a> {
    PostalCode(&'a str),
    FreeText(&'a str),
}

impl<'a> LookupKind<'a> {
    pub fn for_query(query: &'a str) -> Self {
        let trimmed = query.trim();
        if looks_like_postal_code(trimmed) {
            Self::PostalCode(trimmed)
        } else {
            Self::FreeText(query)
        }
    }

    fn params(&self) -> Vec<(&'static str, &'a str)> {
        match *self {
            Self::PostalCode(zip) => vec![("postalCode", zip), ("country", "US")],
            Self::FreeText(text) => vec![("location", text)],
        }
    }
}

pub fn interpret(response: MapQuestResponse) -> Result<GeocodeOutcome, ProviderError> {
    if let Some(info) = &response.info {
        if info.statuscode != 0 {
            return Err(ProviderError::Api {
                provider: PROVIDER.to_string(),
                status: u16::try_from(info.statuscode).unwrap_or(0),
                message: info.messages.join("; "),
            });
        }
    }

    let Some(top) = response
        .results
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.locations.into_iter().next())
    else {
        return Ok(GeocodeOutcome::NoResults);
    };

    if top.admin_area1.as_deref() != Some("US") {
        debug!(country = ?top.admin_area1, "MapQuest result is not in the US");
        return Ok(GeocodeOutcome::NotUs);
    }

    Ok(top
        .lat_lng
        .map(GeocodeOutcome::Found)
        .unwrap_or(GeocodeOutcome::NoResults))
}

pub struct MapQuestGeocoder {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl MapQuestGeocoder {
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
        format!("{}/geocoding/v1/address", self.base_url)
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn geocode(&self, query: &str) -> Result<GeocodeOutcome, ProviderError> {
        let kind = LookupKind::for_query(query);
        debug!(lookup = ?kind, "Querying MapQuest");

        let resp = self
            .client
            .get(self.api_url())
            .query(&[("key", self.api_key.expose_secret())])
            .query(&kind.params())
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

        let body: MapQuestResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e))?;

        interpret(body)
    }
}

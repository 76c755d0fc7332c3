//! Google Civic Information API client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{CivicInfoProvider, LEVEL_COUNTRY, LEVEL_STATE, ROLE_LOWER, ROLE_UPPER};
use crate::error::ProviderError;
use crate::pipeline::types::GeoPoint;

const PROVIDER: &str = "google_civic";
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// `representatives` response, reduced to the fields we read.
///
/// The API reports failures as a JSON body with an `error` object, usually
/// alongside a 4xx status.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CivicResponse {
    #[serde(default)]
    pub offices: Vec<Office>,
    #[serde(default)]
    pub officials: Option<Vec<Official>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub official_indices: Option<Vec<usize>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Official {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phones: Option<Vec<String>>,
}

pub struct GoogleCivicClient {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleCivicClient {
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
        format!("{}/civicinfo/v2/representatives", self.base_url)
    }
}

#[async_trait]
impl CivicInfoProvider for GoogleCivicClient {
    async fn representatives(&self, geo: GeoPoint) -> Result<CivicResponse, ProviderError> {
        let address = format!("{},{}", geo.lat, geo.lng);

        let resp = self
            .client
            .get(self.api_url())
            .query(&[
                ("address", address.as_str()),
                ("levels", LEVEL_COUNTRY),
                ("levels", LEVEL_STATE),
                ("roles", ROLE_LOWER),
                ("roles", ROLE_UPPER),
                ("fields", "offices,officials(name,party,phones)"),
                ("key", self.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        // Error bodies are JSON too; let the caller see the `error` object.
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                ProviderError::invalid(PROVIDER, e)
            } else {
                ProviderError::Api {
                    provider: PROVIDER.to_string(),
                    status: status.as_u16(),
                    message: text.chars().take(200).collect(),
                }
            }
        })
    }
}

//! Open States geo lookup, the second tier for state legislators.
//!
//! Used only when the civic-info provider returned no state seats. Failures
//! here never fail the request: the caller keeps whatever federal
//! representatives were already found.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ResolveError};
use crate::pipeline::types::{GeoPoint, Representative, Title, sort_order};

const PROVIDER: &str = "openstates";
pub const DEFAULT_BASE_URL: &str = "https://openstates.org";

/// Only the first few offices are checked for a phone number.
const MAX_OFFICES_SCANNED: usize = 3;

/// One legislator record from the geo lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateLegislator {
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub offices: Option<Vec<LegislatorOffice>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegislatorOffice {
    #[serde(default)]
    pub phone: Option<String>,
}

/// Service listing state (or DC council) legislators for a point.
#[async_trait]
pub trait StateLegislatureProvider: Send + Sync {
    async fn legislators_at(&self, geo: GeoPoint) -> Result<Vec<StateLegislator>, ProviderError>;
}

/// Convert one record into a representative, or `None` if it has no phone.
pub fn to_representative(record: &StateLegislator) -> Option<Representative> {
    let upper = record.chamber.as_deref() == Some("upper");
    let (mut title, order) = if upper {
        (Title::StateSenator, sort_order::FALLBACK_STATE_UPPER)
    } else {
        (Title::StateRepresentative, sort_order::FALLBACK_STATE_LOWER)
    };

    // DC has a city council, not a legislature.
    if record
        .state
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("dc"))
    {
        title = Title::Councilmember;
    }

    let phone = record
        .offices
        .as_ref()?
        .iter()
        .take(MAX_OFFICES_SCANNED)
        .find_map(|o| o.phone.as_deref().filter(|p| !p.trim().is_empty()))?;

    let name = format!("{} {}", record.first_name.trim(), record.last_name.trim());
    Some(Representative::new(title, &name, phone, order))
}

/// Second tier: appends Open States legislators to what was already found.
#[derive(Clone)]
pub struct StateFallbackResolver {
    provider: Arc<dyn StateLegislatureProvider>,
}

impl StateFallbackResolver {
    pub fn new(provider: Arc<dyn StateLegislatureProvider>) -> Self {
        Self { provider }
    }

    /// Never fails; on error or an empty result `existing` comes back as is.
    pub async fn resolve_state(
        &self,
        geo: GeoPoint,
        mut existing: Vec<Representative>,
    ) -> Vec<Representative> {
        info!("Civic info had no state legislators, trying Open States");

        let records = match self.provider.legislators_at(geo).await {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                let gap = ResolveError::StateFallbackUnavailable("no legislators".into());
                warn!(lat = geo.lat, lng = geo.lng, error = %gap, "Sending without state legislators");
                return existing;
            }
            Err(e) => {
                let gap = ResolveError::StateFallbackUnavailable(e.to_string());
                warn!(lat = geo.lat, lng = geo.lng, error = %gap, "Sending without state legislators");
                return existing;
            }
        };

        let before = existing.len();
        for record in &records {
            match to_representative(record) {
                Some(rep) => existing.push(rep),
                None => debug!(
                    legislator = %format!("{} {}", record.first_name, record.last_name),
                    "Open States record has no phone"
                ),
            }
        }

        info!(added = existing.len() - before, "Added state legislators from Open States");
        existing
    }
}

pub struct OpenStatesClient {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl OpenStatesClient {
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
        format!("{}/api/v1/legislators/geo/", self.base_url)
    }
}

#[async_trait]
impl StateLegislatureProvider for OpenStatesClient {
    async fn legislators_at(&self, geo: GeoPoint) -> Result<Vec<StateLegislator>, ProviderError> {
        let lat = geo.lat.to_string();
        let lng = geo.lng.to_string();

        let resp = self
            .client
            .get(self.api_url())
            .query(&[
                ("lat", lat.as_str()),
                ("long", lng.as_str()),
                ("apikey", self.api_key.expose_secret()),
            ])
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

        resp.json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e))
    }
}

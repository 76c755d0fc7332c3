//! Coordinates → legislators.
//!
//! Two tiers:
//! - [`LegislatorResolver`] asks the civic-info provider for federal and state
//!   legislators.
//! - [`StateFallbackResolver`] fills in state seats from Open States when the
//!   first tier returned none.

pub mod google_civic;
pub mod openstates;

pub use google_civic::{CivicResponse, GoogleCivicClient, Office, Official};
pub use openstates::{OpenStatesClient, StateFallbackResolver, StateLegislatureProvider};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ResolveError};
use crate::pipeline::types::{GeoPoint, Representative, ResolutionResult, Title, sort_order};

pub const LEVEL_COUNTRY: &str = "country";
pub const LEVEL_STATE: &str = "administrativeArea1";
pub const ROLE_UPPER: &str = "legislatorUpperBody";
pub const ROLE_LOWER: &str = "legislatorLowerBody";

/// Service mapping coordinates to officials and the offices they hold.
#[async_trait]
pub trait CivicInfoProvider: Send + Sync {
    /// Legislators (upper and lower chambers, federal and state) at `geo`.
    async fn representatives(&self, geo: GeoPoint) -> Result<CivicResponse, ProviderError>;
}

/// Drop parentheses, then turn the first space into a hyphen.
///
/// `"(202) 224-3121"` becomes `"202-224-3121"`.
pub fn normalize_phone(phone: &str) -> String {
    phone.replace(['(', ')'], "").replacen(' ', "-", 1)
}

/// Title and sort order for an office, from its first level and first role.
fn seat_for_office(office: &Office) -> Option<(Title, u8)> {
    let level = office.levels.first()?.as_str();
    let role = office.roles.first()?.as_str();

    match (level, role) {
        (LEVEL_COUNTRY, ROLE_UPPER) => Some((Title::Senator, sort_order::FEDERAL_SENATE)),
        (LEVEL_COUNTRY, ROLE_LOWER) => Some((Title::Representative, sort_order::FEDERAL_HOUSE)),
        (LEVEL_STATE, ROLE_UPPER) => Some((Title::StateSenator, sort_order::CIVIC_STATE_UPPER)),
        (LEVEL_STATE, ROLE_LOWER) => {
            Some((Title::StateRepresentative, sort_order::CIVIC_STATE_LOWER))
        }
        _ => None,
    }
}

/// Seat held by the official at `index`. The last matching office wins.
fn seat_for_official(index: usize, offices: &[Office]) -> Option<(Title, u8)> {
    offices
        .iter()
        .filter(|o| {
            o.official_indices
                .as_ref()
                .is_some_and(|indices| indices.contains(&index))
        })
        .filter_map(seat_for_office)
        .last()
}

/// Normalize a civic-info payload into representatives.
pub fn normalize(response: CivicResponse) -> Result<ResolutionResult, ResolveError> {
    if let Some(error) = &response.error {
        warn!(error = %error, "Civic info reported an error");
        return Err(ResolveError::NoRepsFound);
    }

    let Some(officials) = response.officials else {
        warn!("Civic info response has no officials");
        return Err(ResolveError::NoRepsFound);
    };

    let mut result = ResolutionResult::default();

    for (index, official) in officials.iter().enumerate() {
        if official.name.trim().eq_ignore_ascii_case("vacant") {
            continue;
        }

        let Some((title, order)) = seat_for_official(index, &response.offices) else {
            debug!(official = %official.name, "No legislative office for official");
            continue;
        };
        if title.is_state_level() {
            result.had_state_level = true;
        }

        let Some(phone) = official.phones.as_ref().and_then(|p| p.first()) else {
            debug!(official = %official.name, "Official has no phone number");
            continue;
        };

        result.representatives.push(Representative::new(
            title,
            &official.name,
            normalize_phone(phone),
            order,
        ));
    }

    Ok(result)
}

/// First tier: federal and state legislators from the civic-info provider.
#[derive(Clone)]
pub struct LegislatorResolver {
    provider: Arc<dyn CivicInfoProvider>,
}

impl LegislatorResolver {
    pub fn new(provider: Arc<dyn CivicInfoProvider>) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, geo: GeoPoint) -> Result<ResolutionResult, ResolveError> {
        let response = self.provider.representatives(geo).await.map_err(|e| {
            warn!(error = %e, "Civic info lookup failed");
            ResolveError::NoRepsFound
        })?;

        let result = normalize(response)?;
        info!(
            reps = result.representatives.len(),
            had_state_level = result.had_state_level,
            "Resolved legislators"
        );
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Civic provider returning a canned payload and counting calls.
    pub(crate) struct StubCivic {
        pub json: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl StubCivic {
        pub(crate) fn new(json: &'static str) -> Arc<Self> {
            Arc::new(Self {
                json: Some(json),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn failing() -> Arc<Self> {
            Arc::new(Self {
                json: None,
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CivicInfoProvider for StubCivic {
        async fn representatives(&self, _geo: GeoPoint) -> Result<CivicResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.json {
                Some(json) => Ok(serde_json::from_str(json).unwrap()),
                None => Err(ProviderError::transport("civic", "timed out")),
            }
        }
    }

    /// Two senators, a House member, a state senator, a vacancy and a
    /// phoneless state rep.
    pub(crate) const FULL_RESPONSE: &str = r#"{
        "offices": [
            {"name": "U.S. Senator", "levels": ["country"], "roles": ["legislatorUpperBody"], "officialIndices": [0, 1]},
            {"name": "U.S. Representative", "levels": ["country"], "roles": ["legislatorLowerBody"], "officialIndices": [2]},
            {"name": "State Senator", "levels": ["administrativeArea1"], "roles": ["legislatorUpperBody"], "officialIndices": [3]},
            {"name": "State Representative", "levels": ["administrativeArea1"], "roles": ["legislatorLowerBody"], "officialIndices": [4, 5]}
        ],
        "officials": [
            {"name": "Alex Padilla", "phones": ["(202) 224-3553"]},
            {"name": "Laife Butler", "phones": ["(202) 224-3841"]},
            {"name": "Nancy Pelosi", "phones": ["(202) 225-4965"]},
            {"name": "Scott Wiener", "phones": ["(916) 651-4011"]},
            {"name": "Vacant"},
            {"name": "Matt Haney"}
        ]
    }"#;

    /// Federal delegation only.
    pub(crate) const FEDERAL_ONLY: &str = r#"{
        "offices": [
            {"levels": ["country"], "roles": ["legislatorUpperBody"], "officialIndices": [0]},
            {"levels": ["country"], "roles": ["legislatorLowerBody"], "officialIndices": [1]}
        ],
        "officials": [
            {"name": "Jane Senator", "phones": ["(202) 224-0001"]},
            {"name": "John House", "phones": ["(202) 225-0002"]}
        ]
    }"#;

    fn parse(json: &str) -> CivicResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn phone_normalization_is_paren_strip_then_first_space() {
        assert_eq!(normalize_phone("(202) 224-3121"), "202-224-3121");
        assert_eq!(normalize_phone("(555) 123 4567"), "555-123 4567");
        assert_eq!(normalize_phone("202-224-3121"), "202-224-3121");
    }

    #[test]
    fn normalize_maps_offices_to_titles() {
        let result = normalize(parse(FULL_RESPONSE)).unwrap();
        let names: Vec<_> = result
            .representatives
            .iter()
            .map(|r| (r.display_name.as_str(), r.phone.as_str(), r.sort_order))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Senator Alex Padilla", "202-224-3553", 0),
                ("Senator Laife Butler", "202-224-3841", 0),
                ("Representative Nancy Pelosi", "202-225-4965", 1),
                ("State Sen. Scott Wiener", "916-651-4011", 2),
            ]
        );
        assert!(result.had_state_level);
    }

    #[test]
    fn federal_only_has_no_state_level() {
        let result = normalize(parse(FEDERAL_ONLY)).unwrap();
        assert_eq!(result.representatives.len(), 2);
        assert!(!result.had_state_level);
    }

    #[test]
    fn officials_without_an_office_are_dropped() {
        let json = r#"{
            "offices": [{"levels": ["country"], "roles": ["headOfState"], "officialIndices": [0]}],
            "officials": [{"name": "Someone", "phones": ["(202) 456-1111"]}, {"name": "Nobody", "phones": ["1"]}]
        }"#;
        let result = normalize(parse(json)).unwrap();
        assert!(result.representatives.is_empty());
    }

    #[test]
    fn provider_error_or_missing_officials_is_no_reps() {
        let error = r#"{"error": {"code": 404, "message": "Failed to parse address"}}"#;
        assert_eq!(normalize(parse(error)), Err(ResolveError::NoRepsFound));
        assert_eq!(normalize(parse(r#"{"offices": []}"#)), Err(ResolveError::NoRepsFound));
    }

    #[tokio::test]
    async fn transport_failure_is_no_reps() {
        let resolver = LegislatorResolver::new(StubCivic::failing());
        let got = resolver.resolve(GeoPoint::new(0.0, 0.0)).await;
        assert_eq!(got, Err(ResolveError::NoRepsFound));
    }
}

//! Address → coordinates.
//!
//! Geocoders are tried in order by [`GeocoderChain`]:
//! 1. [`ZipCache`]: local table, no network
//! 2. [`GoogleGeocoder`]: primary provider
//! 3. [`MapQuestGeocoder`]: secondary provider
//!
//! A confirmed non-US result stops the chain. An empty result (or a provider
//! error) moves on to the next geocoder.

pub mod google;
pub mod mapquest;
pub mod zip_cache;

pub use google::GoogleGeocoder;
pub use mapquest::MapQuestGeocoder;
pub use zip_cache::ZipCache;

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ResolveError};
use crate::pipeline::types::GeoPoint;

static ZIP5: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").unwrap());
static ZIP_PLUS4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(-?\d{4})?$").unwrap());

/// Exactly five digits, ignoring surrounding whitespace.
pub fn is_zip5(query: &str) -> bool {
    ZIP5.is_match(query.trim())
}

/// A 5-digit ZIP or ZIP+4.
pub fn looks_like_postal_code(query: &str) -> bool {
    ZIP_PLUS4.is_match(query.trim())
}

/// Result of one geocoder attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    /// Placed inside the US.
    Found(GeoPoint),
    /// Nothing found; the next geocoder may do better.
    NoResults,
    /// Placed, but outside the US. Authoritative: stops the chain.
    NotUs,
}

/// One geocoding strategy.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn geocode(&self, query: &str) -> Result<GeocodeOutcome, ProviderError>;
}

/// Ordered fallback over geocoders.
#[derive(Clone)]
pub struct GeocoderChain {
    geocoders: Vec<Arc<dyn Geocoder>>,
}

impl GeocoderChain {
    pub fn new(geocoders: Vec<Arc<dyn Geocoder>>) -> Self {
        Self { geocoders }
    }

    /// Resolve free text to US coordinates.
    pub async fn resolve(&self, raw_query: &str) -> Result<GeoPoint, ResolveError> {
        info!(query = %raw_query, "Geocoding address");

        for geocoder in &self.geocoders {
            let outcome = match geocoder.geocode(raw_query).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(geocoder = geocoder.name(), error = %e, "Geocoder failed, trying next");
                    GeocodeOutcome::NoResults
                }
            };

            match outcome {
                GeocodeOutcome::Found(point) => {
                    info!(geocoder = geocoder.name(), lat = point.lat, lng = point.lng, "Geocoded");
                    return Ok(point);
                }
                GeocodeOutcome::NotUs => {
                    info!(geocoder = geocoder.name(), "Address is not in the US");
                    return Err(ResolveError::NotUsAddress);
                }
                GeocodeOutcome::NoResults => {
                    debug!(geocoder = geocoder.name(), "No results");
                }
            }
        }

        Err(ResolveError::NoResults)
    }
}

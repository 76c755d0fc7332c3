//! In-memory ZIP → coordinate table.
//!
//! Loaded once at startup from a CSV file with `zip,lat,lng` rows. Fields may
//! be quoted. Blank lines, `#` comments and a header row are skipped. After
//! loading the table is read-only and shared behind an `Arc`.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{info, warn};

use super::{GeocodeOutcome, Geocoder, is_zip5};
use crate::error::{ConfigError, ProviderError};
use crate::pipeline::types::GeoPoint;

#[derive(Debug, Deserialize)]
struct ZipRow {
    zip: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ZipCache {
    entries: HashMap<String, GeoPoint>,
}

impl ZipCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse CSV text. Malformed rows are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut entries = HashMap::new();

        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Unreadable ZIP cache row");
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            // Header row or junk.
            if !record.get(0).is_some_and(is_zip5) {
                continue;
            }

            match record.deserialize::<ZipRow>(None) {
                Ok(row) => {
                    entries.insert(row.zip, GeoPoint::new(row.lat, row.lng));
                }
                Err(e) => warn!(line, error = %e, "ZIP cache row has bad coordinates"),
            }
        }

        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cache = Self::parse(&text);
        info!(path = %path.display(), zips = cache.len(), "Loaded ZIP cache");
        Ok(cache)
    }

    pub fn get(&self, zip: &str) -> Option<GeoPoint> {
        self.entries.get(zip).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Geocoder for ZipCache {
    fn name(&self) -> &str {
        "zip_cache"
    }

    async fn geocode(&self, query: &str) -> Result<GeocodeOutcome, ProviderError> {
        let query = query.trim();
        if !is_zip5(query) {
            return Ok(GeocodeOutcome::NoResults);
        }
        Ok(self
            .get(query)
            .map(GeocodeOutcome::Found)
            .unwrap_or(GeocodeOutcome::NoResults))
    }
}

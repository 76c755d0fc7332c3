//! Service configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::pipeline::compose::DedupStrategy;

/// Base URLs for every external provider. Overridable for testing.
#[derive(Debug, Clone)]
pub struct ProviderUrls {
    /// Google Geocoding.
    pub google: String,
    /// Google Civic Information. A different host from Geocoding.
    pub google_civic: String,
    pub mapquest: String,
    pub openstates: String,
    pub plivo: String,
}

impl Default for ProviderUrls {
    fn default() -> Self {
        Self {
            google: crate::geo::google::DEFAULT_BASE_URL.to_string(),
            google_civic: crate::civic::google_civic::DEFAULT_BASE_URL.to_string(),
            mapquest: crate::geo::mapquest::DEFAULT_BASE_URL.to_string(),
            openstates: crate::civic::openstates::DEFAULT_BASE_URL.to_string(),
            plivo: crate::channels::plivo::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Everything `main` needs to wire the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP port for the SMS webhook.
    pub port: u16,
    /// Used for both Geocoding and Civic Information.
    pub google_api_key: SecretString,
    pub mapquest_api_key: SecretString,
    pub openstates_api_key: SecretString,
    pub plivo_auth_id: String,
    pub plivo_auth_token: SecretString,
    /// Numbers replies are sent from; one is picked per reply.
    pub outbound_numbers: Vec<String>,
    /// Optional `zip,lat,lng` CSV for the local ZIP cache.
    pub zip_cache_path: Option<PathBuf>,
    pub dedup: DedupStrategy,
    /// Per-request timeout for provider calls.
    pub http_timeout: Duration,
    pub urls: ProviderUrls,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let port: u16 = match get("REPCALL_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "REPCALL_PORT".into(),
                message: format!("not a port number: {raw}"),
            })?,
            None => 8080,
        };

        let outbound_numbers: Vec<String> = required("REPCALL_OUTBOUND_NUMBERS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if outbound_numbers.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "REPCALL_OUTBOUND_NUMBERS".into(),
                message: "no numbers listed".into(),
            });
        }

        let dedup = match get("REPCALL_DEDUP").as_deref().map(str::trim) {
            None | Some("false") | Some("0") => DedupStrategy::None,
            Some("true") | Some("1") => DedupStrategy::ByNameAndPhone,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "REPCALL_DEDUP".into(),
                    message: format!("expected true or false, got {other}"),
                });
            }
        };

        let http_timeout_secs: u64 = match get("REPCALL_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "REPCALL_HTTP_TIMEOUT_SECS".into(),
                        message: format!("expected a positive number of seconds, got {raw}"),
                    });
                }
            },
            None => 10,
        };

        let defaults = ProviderUrls::default();
        let urls = ProviderUrls {
            google: get("GOOGLE_BASE_URL").unwrap_or(defaults.google),
            google_civic: get("GOOGLE_CIVIC_BASE_URL").unwrap_or(defaults.google_civic),
            mapquest: get("MAPQUEST_BASE_URL").unwrap_or(defaults.mapquest),
            openstates: get("OPENSTATES_BASE_URL").unwrap_or(defaults.openstates),
            plivo: get("PLIVO_BASE_URL").unwrap_or(defaults.plivo),
        };

        Ok(Self {
            port,
            google_api_key: SecretString::from(required("GOOGLE_API_KEY")?),
            mapquest_api_key: SecretString::from(required("MAPQUEST_API_KEY")?),
            openstates_api_key: SecretString::from(required("OPENSTATES_API_KEY")?),
            plivo_auth_id: required("PLIVO_AUTH_ID")?,
            plivo_auth_token: SecretString::from(required("PLIVO_AUTH_TOKEN")?),
            outbound_numbers,
            zip_cache_path: get("REPCALL_ZIP_CACHE").map(PathBuf::from),
            dedup,
            http_timeout: Duration::from_secs(http_timeout_secs),
            urls,
        })
    }
}

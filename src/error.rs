//! Error types for repcall.

use crate::geo::looks_like_postal_code;

/// Startup errors. Per-message failures end in a reply, not an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to an external geocoding, civic or legislature service.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} request failed: {reason}")]
    Transport { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} returned {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },
}

impl ProviderError {
    pub(crate) fn transport(provider: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn invalid(provider: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Outcomes of the resolution pipeline that end in a canned reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("address is outside the United States")]
    NotUsAddress,

    #[error("no geocoder could place the address")]
    NoResults,

    #[error("no representatives found for the location")]
    NoRepsFound,

    #[error("state legislature lookup unavailable: {0}")]
    StateFallbackUnavailable(String),
}

pub const NOT_US_REPLY: &str = "I'm sorry, I can't find that address within the U.S.";
pub const NO_RESULTS_REPLY: &str =
    "I'm sorry, I don't understand that address. Would you try writing it a different way?";
pub const ZIP_ONLY_REPLY: &str =
    "I'm sorry, sometimes zip code alone does not work. Try again with a postal address?";
pub const NO_REPS_REPLY: &str = "I'm sorry, I can't find representatives for that address.";

impl ResolveError {
    /// The reply sent to the texter when resolution stops here.
    ///
    /// `raw_query` is the text the sender supplied; ZIP-only queries get a
    /// hint to retry with a street address.
    pub fn user_message(&self, raw_query: &str) -> &'static str {
        match self {
            Self::NotUsAddress => NOT_US_REPLY,
            Self::NoResults => NO_RESULTS_REPLY,
            Self::NoRepsFound | Self::StateFallbackUnavailable(_) => {
                if looks_like_postal_code(raw_query) || is_all_digits(raw_query) {
                    ZIP_ONLY_REPLY
                } else {
                    NO_REPS_REPLY
                }
            }
        }
    }
}

fn is_all_digits(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// SMS channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

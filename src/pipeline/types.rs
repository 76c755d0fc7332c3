//! Shared types for the resolution pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound / outbound ──────────────────────────────────────────────

/// A text message delivered by the SMS webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Transport message id (MessageUUID), or a generated UUID.
    pub message_id: String,
    /// Sender phone number; replies go back here.
    pub sender: String,
    /// Raw message body as typed by the sender.
    pub text: String,
    /// When set, the reply is logged instead of sent.
    pub debug: bool,
    /// When the webhook received the message.
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            text: text.into(),
            debug: false,
            received_at: Utc::now(),
        }
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// The reply produced for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    /// Our number the SMS is sent from.
    pub sender_number: String,
    /// The texter's number.
    pub recipient: String,
    pub body: String,
    pub debug: bool,
}

// ── Geography ───────────────────────────────────────────────────────

/// A latitude/longitude pair.
///
/// Field names match the `{lat, lng}` objects both geocoding providers return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

// ── Representatives ─────────────────────────────────────────────────

/// Office held by a representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Title {
    Senator,
    Representative,
    StateSenator,
    StateRepresentative,
    Councilmember,
}

impl Title {
    /// Prefix used in front of the person's name in replies.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Senator => "Senator",
            Self::Representative => "Representative",
            Self::StateSenator => "State Sen.",
            Self::StateRepresentative => "State Rep.",
            Self::Councilmember => "Councilmember",
        }
    }

    pub fn is_state_level(&self) -> bool {
        !matches!(self, Self::Senator | Self::Representative)
    }
}

/// Display precedence. Lower sorts first.
pub mod sort_order {
    pub const FEDERAL_SENATE: u8 = 0;
    pub const FEDERAL_HOUSE: u8 = 1;
    pub const CIVIC_STATE_UPPER: u8 = 2;
    pub const CIVIC_STATE_LOWER: u8 = 3;
    pub const FALLBACK_STATE_UPPER: u8 = 3;
    pub const FALLBACK_STATE_LOWER: u8 = 4;
}

/// One line of the reply: who to call and at what number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Representative {
    /// `"<title prefix> <name>"`, e.g. `"State Sen. Jane Doe"`.
    pub display_name: String,
    pub title: Title,
    pub phone: String,
    pub sort_order: u8,
}

impl Representative {
    pub fn new(title: Title, name: &str, phone: impl Into<String>, sort_order: u8) -> Self {
        Self {
            display_name: format!("{} {}", title.prefix(), name.trim()),
            title,
            phone: phone.into(),
            sort_order,
        }
    }
}

/// What the civic-info lookup found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    pub representatives: Vec<Representative>,
    /// At least one state legislature seat was resolved.
    pub had_state_level: bool,
}

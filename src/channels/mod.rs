//! SMS I/O: the inbound webhook and the outbound sender.

pub mod plivo;
pub mod webhook;

pub use plivo::PlivoSender;
pub use webhook::{WebhookForm, sms_routes};

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::pipeline::types::OutboundMessage;

/// What the transport said about an accepted message.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub status: u16,
    pub api_response: serde_json::Value,
}

/// Outbound SMS transport.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Transport name for logs.
    fn name(&self) -> &str;

    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, ChannelError>;
}

//! Plivo Message API sender.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{SendReceipt, SmsSender};
use crate::error::ChannelError;
use crate::pipeline::types::OutboundMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.plivo.com";

pub struct PlivoSender {
    auth_id: String,
    auth_token: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl PlivoSender {
    pub fn new(auth_id: String, auth_token: SecretString, client: reqwest::Client) -> Self {
        Self {
            auth_id,
            auth_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self) -> String {
        format!("{}/v1/Account/{}/Message/", self.base_url, self.auth_id)
    }
}

#[async_trait]
impl SmsSender for PlivoSender {
    fn name(&self) -> &str {
        "plivo"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, ChannelError> {
        let body = serde_json::json!({
            "src": message.sender_number,
            "dst": message.recipient,
            "text": message.body,
        });

        let resp = self
            .client
            .post(self.api_url())
            .basic_auth(&self.auth_id, Some(self.auth_token.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "plivo".into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ChannelError::SendFailed {
                name: "plivo".into(),
                reason: format!("{status}: {text}"),
            });
        }

        let api_response = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        Ok(SendReceipt {
            status: status.as_u16(),
            api_response,
        })
    }
}

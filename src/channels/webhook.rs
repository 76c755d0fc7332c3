//! Inbound SMS webhook.
//!
//! The SMS provider POSTs a form for every text received. The handler always
//! answers `200` at once; resolution and the reply run on a spawned task, so
//! later failures show up only in logs and in the reply text.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Form, State, rejection::FormRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ChannelError;
use crate::pipeline::processor::MessageProcessor;
use crate::pipeline::types::InboundMessage;

/// Form fields sent by the provider.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "MessageUUID", default)]
    pub message_uuid: Option<String>,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Debug", default)]
    pub debug: Option<String>,
}

impl WebhookForm {
    /// Any non-empty `Debug` value other than `0`/`false` turns debug on.
    pub fn debug_flag(&self) -> bool {
        self.debug.as_deref().map(str::trim).is_some_and(|v| {
            !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
        })
    }

    pub fn into_inbound(self) -> Result<InboundMessage, ChannelError> {
        if self.from.trim().is_empty() {
            return Err(ChannelError::InvalidMessage("missing From".into()));
        }

        let debug = self.debug_flag();
        let mut msg = InboundMessage::new(self.from.trim(), self.text).with_debug(debug);
        if let Some(id) = self.message_uuid.filter(|id| !id.is_empty()) {
            msg = msg.with_message_id(id);
        }
        Ok(msg)
    }
}

#[derive(Clone)]
struct WebhookState {
    processor: Arc<MessageProcessor>,
}

/// `POST /sms` and `GET /health`.
pub fn sms_routes(processor: Arc<MessageProcessor>) -> Router {
    Router::new()
        .route("/sms", post(receive_sms))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(WebhookState { processor })
}

async fn receive_sms(
    State(state): State<WebhookState>,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> StatusCode {
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            warn!(error = %e, "Unreadable SMS webhook body");
            return StatusCode::OK;
        }
    };

    let inbound = match form.into_inbound() {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, "Dropping inbound SMS");
            return StatusCode::OK;
        }
    };

    info!(
        message_id = %inbound.message_id,
        from = %inbound.sender,
        text = %inbound.text,
        debug = inbound.debug,
        "Incoming SMS"
    );

    let processor = Arc::clone(&state.processor);
    tokio::spawn(async move {
        processor.handle(inbound).await;
    });

    StatusCode::OK
}

async fn health() -> &'static str {
    "ok"
}

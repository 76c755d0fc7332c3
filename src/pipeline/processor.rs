//! Drives one inbound text through the pipeline and sends the reply.

use std::sync::Arc;

use tracing::{error, info};

use crate::channels::{PlivoSender, SmsSender};
use crate::civic::{GoogleCivicClient, LegislatorResolver, OpenStatesClient, StateFallbackResolver};
use crate::config::ServiceConfig;
use crate::error::{ConfigError, ResolveError};
use crate::geo::{Geocoder, GeocoderChain, GoogleGeocoder, MapQuestGeocoder, ZipCache};
use crate::pipeline::compose::ResponseComposer;
use crate::pipeline::intent::classify;
use crate::pipeline::selector::{RandomSelector, Selector, choose};
use crate::pipeline::types::{InboundMessage, OutboundMessage};

/// Collaborators for [`MessageProcessor`], built once at startup.
pub struct ProcessorDeps {
    pub geocoder: GeocoderChain,
    pub legislators: LegislatorResolver,
    pub state_fallback: StateFallbackResolver,
    pub composer: ResponseComposer,
    pub sender: Arc<dyn SmsSender>,
    /// Our numbers; each reply goes out from one of them.
    pub outbound_numbers: Vec<String>,
    pub selector: Arc<dyn Selector>,
}

pub struct MessageProcessor {
    deps: ProcessorDeps,
}

impl MessageProcessor {
    pub fn new(deps: ProcessorDeps) -> Self {
        Self { deps }
    }

    /// Wire the production providers from configuration.
    pub fn from_config(config: &ServiceConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "REPCALL_HTTP_TIMEOUT_SECS".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let zip_cache = match &config.zip_cache_path {
            Some(path) => ZipCache::load(path)?,
            None => ZipCache::empty(),
        };

        let geocoder = GeocoderChain::new(vec![
            Arc::new(zip_cache) as Arc<dyn Geocoder>,
            Arc::new(
                GoogleGeocoder::new(config.google_api_key.clone(), client.clone())
                    .with_base_url(&config.urls.google),
            ) as Arc<dyn Geocoder>,
            Arc::new(
                MapQuestGeocoder::new(config.mapquest_api_key.clone(), client.clone())
                    .with_base_url(&config.urls.mapquest),
            ) as Arc<dyn Geocoder>,
        ]);

        let civic = GoogleCivicClient::new(config.google_api_key.clone(), client.clone())
            .with_base_url(&config.urls.google_civic);
        let states = OpenStatesClient::new(config.openstates_api_key.clone(), client.clone())
            .with_base_url(&config.urls.openstates);
        let sender = PlivoSender::new(
            config.plivo_auth_id.clone(),
            config.plivo_auth_token.clone(),
            client,
        )
        .with_base_url(&config.urls.plivo);

        let selector: Arc<dyn Selector> = Arc::new(RandomSelector);

        Ok(Self::new(ProcessorDeps {
            geocoder,
            legislators: LegislatorResolver::new(Arc::new(civic)),
            state_fallback: StateFallbackResolver::new(Arc::new(states)),
            composer: ResponseComposer::new(Arc::clone(&selector)).with_dedup(config.dedup),
            sender: Arc::new(sender),
            outbound_numbers: config.outbound_numbers.clone(),
            selector,
        }))
    }

    /// Produce the reply for an inbound message and dispatch it.
    ///
    /// Exactly one reply is produced per message. Returns it for logging and
    /// tests; when `debug` is set it was not sent.
    pub async fn handle(&self, inbound: InboundMessage) -> OutboundMessage {
        let body = self.reply_text(&inbound.text).await;
        let outbound = self.outbound_for(&inbound, body);

        self.dispatch(&outbound).await;

        let elapsed_ms = (chrono::Utc::now() - inbound.received_at).num_milliseconds();
        info!(message_id = %inbound.message_id, elapsed_ms, "Handled SMS");
        outbound
    }

    /// Reply text for raw inbound text.
    pub async fn reply_text(&self, text: &str) -> String {
        match classify(text).canned_reply() {
            Some(reply) => reply.to_string(),
            None => self.resolve(text).await,
        }
    }

    /// Geocode → civic info → optional state fallback → compose.
    async fn resolve(&self, raw_query: &str) -> String {
        let geo = match self.deps.geocoder.resolve(raw_query).await {
            Ok(geo) => geo,
            Err(e) => {
                info!(query = %raw_query, reason = %e, "Geocoding stopped");
                return e.user_message(raw_query).to_string();
            }
        };

        let result = match self.deps.legislators.resolve(geo).await {
            Ok(result) => result,
            Err(e) => {
                info!(query = %raw_query, reason = %e, "Civic info lookup stopped");
                return e.user_message(raw_query).to_string();
            }
        };

        let reps = if result.had_state_level {
            result.representatives
        } else {
            self.deps
                .state_fallback
                .resolve_state(geo, result.representatives)
                .await
        };

        self.deps
            .composer
            .compose(reps, ResolveError::NoRepsFound.user_message(raw_query))
    }

    fn outbound_for(&self, inbound: &InboundMessage, body: String) -> OutboundMessage {
        let sender_number = choose(self.deps.selector.as_ref(), &self.deps.outbound_numbers)
            .cloned()
            .unwrap_or_default();

        OutboundMessage {
            sender_number,
            recipient: inbound.sender.clone(),
            body,
            debug: inbound.debug,
        }
    }

    async fn dispatch(&self, outbound: &OutboundMessage) {
        info!(to = %outbound.recipient, body = %outbound.body, "Reply");

        if outbound.debug {
            info!("Debug flag. No message sent.");
            return;
        }

        match self.deps.sender.send(outbound).await {
            Ok(receipt) => info!(
                transport = self.deps.sender.name(),
                status = receipt.status,
                response = %receipt.api_response,
                "SMS dispatched"
            ),
            Err(e) => error!(transport = self.deps.sender.name(), error = %e, "SMS dispatch failed"),
        }
    }
}

use super::{default_timeout_secs, embed_payload, http_client, message_handle, read_response};
use crate::error::{DeliveryError, Result};
use crate::plugin::SinkPlugin;
use crate::report::Report;
use crate::{DeliverySink, MessageHandle};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Posts the dashboard through a Discord channel webhook; no bot token needed.
pub struct WebhookSink {
    client: reqwest::Client,
    base_url: String,
    /// Query string of the configured URL (e.g. `thread_id=..`), kept on every request.
    query: Option<String>,
}

impl WebhookSink {
    pub fn new(client: reqwest::Client, webhook_url: &str) -> Self {
        let (base, query) = match webhook_url.split_once('?') {
            Some((base, query)) if !query.is_empty() => (base, Some(query.to_string())),
            Some((base, _)) => (base, None),
            None => (webhook_url, None),
        };
        Self {
            client,
            base_url: base.trim_end_matches('/').to_string(),
            query,
        }
    }

    /// `wait=true` makes Discord return the created message, including its id.
    pub fn create_url(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}&wait=true", self.base_url),
            None => format!("{}?wait=true", self.base_url),
        }
    }

    pub fn edit_url(&self, handle: &MessageHandle) -> String {
        match &self.query {
            Some(q) => format!("{}/messages/{handle}?{q}", self.base_url),
            None => format!("{}/messages/{handle}", self.base_url),
        }
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    async fn create(&self, initial: &Report) -> Result<MessageHandle> {
        let resp = self
            .client
            .post(self.create_url())
            .json(&embed_payload(initial))
            .send()
            .await?;
        let body = read_response("webhook", resp).await?;
        let handle = message_handle(&body)?;
        tracing::info!(message_id = %handle, "Dashboard message created via webhook");
        Ok(handle)
    }

    async fn update(&self, handle: &MessageHandle, report: &Report) -> Result<()> {
        let resp = self
            .client
            .patch(self.edit_url(handle))
            .json(&embed_payload(report))
            .send()
            .await?;
        read_response("webhook", resp).await?;
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "webhook"
    }
}

// Plugin

#[derive(Deserialize)]
struct WebhookConfig {
    webhook_url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl WebhookConfig {
    fn parse(config: &Value) -> Result<Self> {
        let cfg: Self = serde_json::from_value(config.clone())
            .map_err(|e| DeliveryError::InvalidConfig(format!("webhook: {e}")))?;
        let url = cfg.webhook_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(DeliveryError::InvalidConfig(
                "webhook: webhook_url must be an http(s) URL".to_string(),
            ));
        }
        if cfg.timeout_secs == 0 {
            return Err(DeliveryError::InvalidConfig(
                "webhook: timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(cfg)
    }
}

pub struct WebhookPlugin;

impl SinkPlugin for WebhookPlugin {
    fn name(&self) -> &str {
        "webhook"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        WebhookConfig::parse(config).map(|_| ())
    }

    fn create_sink(&self, config: &Value) -> Result<Box<dyn DeliverySink>> {
        let cfg = WebhookConfig::parse(config)?;
        let client = http_client(cfg.timeout_secs)?;
        Ok(Box::new(WebhookSink::new(client, cfg.webhook_url.trim())))
    }
}

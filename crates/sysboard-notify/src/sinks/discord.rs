use super::{default_timeout_secs, embed_payload, http_client, message_handle, read_response};
use crate::error::{DeliveryError, Result};
use crate::plugin::SinkPlugin;
use crate::report::Report;
use crate::{DeliverySink, MessageHandle};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Posts the dashboard as a bot-authored embed in one channel.
pub struct DiscordSink {
    client: reqwest::Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl DiscordSink {
    pub fn new(client: reqwest::Client, api_base: &str, token: &str, channel_id: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_id: channel_id.to_string(),
        }
    }

    pub fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    pub fn message_url(&self, handle: &MessageHandle) -> String {
        format!("{}/{}", self.messages_url(), handle)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }
}

#[async_trait]
impl DeliverySink for DiscordSink {
    async fn create(&self, initial: &Report) -> Result<MessageHandle> {
        let resp = self
            .client
            .post(self.messages_url())
            .header(AUTHORIZATION, self.auth_header())
            .json(&embed_payload(initial))
            .send()
            .await?;
        let body = read_response("discord", resp).await?;
        let handle = message_handle(&body)?;
        tracing::info!(
            channel_id = %self.channel_id,
            message_id = %handle,
            "Dashboard message created"
        );
        Ok(handle)
    }

    async fn update(&self, handle: &MessageHandle, report: &Report) -> Result<()> {
        let resp = self
            .client
            .patch(self.message_url(handle))
            .header(AUTHORIZATION, self.auth_header())
            .json(&embed_payload(report))
            .send()
            .await?;
        read_response("discord", resp).await?;
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "discord"
    }
}

// Plugin

#[derive(Deserialize)]
struct DiscordConfig {
    token: String,
    channel_id: String,
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl DiscordConfig {
    fn parse(config: &Value) -> Result<Self> {
        let cfg: Self = serde_json::from_value(config.clone())
            .map_err(|e| DeliveryError::InvalidConfig(format!("discord: {e}")))?;
        if cfg.token.trim().is_empty() {
            return Err(DeliveryError::InvalidConfig(
                "discord: token is empty".to_string(),
            ));
        }
        if cfg.channel_id.is_empty() || !cfg.channel_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(DeliveryError::InvalidConfig(format!(
                "discord: channel_id '{}' is not a numeric id",
                cfg.channel_id
            )));
        }
        if cfg.timeout_secs == 0 {
            return Err(DeliveryError::InvalidConfig(
                "discord: timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(cfg)
    }
}

pub struct DiscordPlugin;

impl SinkPlugin for DiscordPlugin {
    fn name(&self) -> &str {
        "discord"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        DiscordConfig::parse(config).map(|_| ())
    }

    fn create_sink(&self, config: &Value) -> Result<Box<dyn DeliverySink>> {
        let cfg = DiscordConfig::parse(config)?;
        let client = http_client(cfg.timeout_secs)?;
        let api_base = cfg.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        Ok(Box::new(DiscordSink::new(
            client,
            api_base,
            &cfg.token,
            &cfg.channel_id,
        )))
    }
}

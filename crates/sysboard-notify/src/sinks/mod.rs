pub mod console;
pub mod discord;
pub mod webhook;

use crate::error::{DeliveryError, Result};
use crate::report::Report;
use crate::utils::{truncate_chars, MAX_BODY_LENGTH};
use crate::MessageHandle;
use chrono::SecondsFormat;
use serde_json::{json, Value};
use std::time::Duration;

// Discord embed limits
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 4096;
const MAX_FIELD_NAME_CHARS: usize = 256;
const MAX_FIELD_VALUE_CHARS: usize = 1024;
const MAX_FIELDS: usize = 25;

/// Discord rejects HTTP API clients that do not identify as `DiscordBot (url, version)`.
pub const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_REPOSITORY"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

pub(crate) fn default_timeout_secs() -> u64 {
    10
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Builds a Discord message body holding a single embed.
pub(crate) fn embed_payload(report: &Report) -> Value {
    let fields: Vec<Value> = report
        .fields
        .iter()
        .take(MAX_FIELDS)
        .map(|field| {
            json!({
                "name": truncate_chars(&field.name, MAX_FIELD_NAME_CHARS),
                "value": truncate_chars(&field.value, MAX_FIELD_VALUE_CHARS),
                "inline": field.inline,
            })
        })
        .collect();

    let mut embed = serde_json::Map::new();
    if let Some(title) = &report.title {
        embed.insert(
            "title".to_string(),
            Value::String(truncate_chars(title, MAX_TITLE_CHARS)),
        );
    }
    embed.insert(
        "description".to_string(),
        Value::String(truncate_chars(&report.description, MAX_DESCRIPTION_CHARS)),
    );
    if let Some(color) = report.color {
        embed.insert("color".to_string(), json!(color));
    }
    if !fields.is_empty() {
        embed.insert("fields".to_string(), Value::Array(fields));
    }
    if let Some(ts) = report.timestamp {
        embed.insert(
            "timestamp".to_string(),
            Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }

    json!({ "embeds": [Value::Object(embed)] })
}

/// Maps a Discord API response to its JSON body, or to a typed error.
pub(crate) async fn read_response(service: &str, resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let text = resp.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text)?);
    }

    if status.as_u16() == 429 {
        let retry_after_secs = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body["retry_after"].as_f64())
            .unwrap_or(0.0);
        return Err(DeliveryError::RateLimited {
            service: service.to_string(),
            retry_after_ms: (retry_after_secs * 1000.0).max(0.0) as u64,
        });
    }

    Err(DeliveryError::ApiError {
        service: service.to_string(),
        status: status.as_u16(),
        body: truncate_chars(&text, MAX_BODY_LENGTH),
    })
}

/// Extracts the message id from a "create message" response.
pub(crate) fn message_handle(body: &Value) -> Result<MessageHandle> {
    body["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(|id| MessageHandle(id.to_string()))
        .ok_or_else(|| DeliveryError::ApiError {
            service: "discord".to_string(),
            status: 200,
            body: "response has no message id".to_string(),
        })
}

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use sysboard_notify::report::ReportLayout;

pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Time between two dashboard refreshes
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// How long an in-flight refresh may run after a shutdown request
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub report: ReportLayout,
}

#[derive(Debug, Deserialize)]
pub struct SinkConfig {
    #[serde(rename = "type", default = "default_sink_type")]
    pub sink_type: String,
    /// Plugin-specific settings, validated by the sink plugin.
    #[serde(default = "empty_object")]
    pub config: Value,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            sink_type: default_sink_type(),
            config: empty_object(),
        }
    }
}

fn default_refresh_interval_ms() -> u64 {
    15_000
}

fn default_shutdown_grace_ms() -> u64 {
    5_000
}

fn default_sink_type() -> String {
    "discord".to_string()
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            sink: SinkConfig::default(),
            report: ReportLayout::default(),
        }
    }
}

/// Environment variables that override the config file, and the sink
/// config key each one sets.
const SINK_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DISCORD_TOKEN", "token"),
    ("DISCORD_CHANNEL_ID", "channel_id"),
    ("DISCORD_WEBHOOK_URL", "webhook_url"),
];

const REFRESH_INTERVAL_ENV: &str = "SYSBOARD_REFRESH_INTERVAL_MS";

impl AgentConfig {
    /// Loads the TOML file at `path` (defaults when it does not exist),
    /// applies environment overrides and validates the result.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            tracing::info!(path, "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Applies overrides looked up through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for &(env_key, config_key) in SINK_ENV_OVERRIDES {
            if let Some(value) = lookup(env_key).filter(|v| !v.is_empty()) {
                if !self.sink.config.is_object() {
                    self.sink.config = empty_object();
                }
                if let Value::Object(map) = &mut self.sink.config {
                    map.insert(config_key.to_string(), Value::String(value));
                }
            }
        }

        if let Some(raw) = lookup(REFRESH_INTERVAL_ENV) {
            self.refresh_interval_ms = raw.trim().parse().map_err(|e| {
                anyhow::anyhow!("{REFRESH_INTERVAL_ENV}={raw} is not a valid number: {e}")
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh_interval_ms == 0 {
            anyhow::bail!("refresh_interval_ms must be greater than 0");
        }
        if self.report.cores_per_line == 0 {
            anyhow::bail!("report.cores_per_line must be at least 1");
        }
        if self.sink.sink_type.trim().is_empty() {
            anyhow::bail!("sink.type must not be empty");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AgentConfig::from_toml("").unwrap();
        assert_eq!(config.refresh_interval_ms, 15_000);
        assert_eq!(config.shutdown_grace_ms, 5_000);
        assert_eq!(config.sink.sink_type, "discord");
        assert!(config.sink.config.as_object().is_some_and(|m| m.is_empty()));
        assert_eq!(config.report, ReportLayout::default());
    }

    #[test]
    fn parses_full_file() {
        let config = AgentConfig::from_toml(
            r#"
refresh_interval_ms = 30000

[sink]
type = "webhook"

[sink.config]
webhook_url = "https://discord.com/api/webhooks/1/abc"
timeout_secs = 5

[report]
title = "db-01"
cores_per_line = 4
"#,
        )
        .unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.sink.sink_type, "webhook");
        assert_eq!(config.sink.config["timeout_secs"], 5);
        assert_eq!(config.report.title, "db-01");
        assert_eq!(config.report.cores_per_line, 4);
        assert_eq!(config.report.description, "Live system information");
    }

    #[test]
    fn env_overrides_sink_settings() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DISCORD_TOKEN", "secret-token"),
            ("DISCORD_CHANNEL_ID", "1234"),
            ("SYSBOARD_REFRESH_INTERVAL_MS", "2000"),
        ]);
        let mut config = AgentConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.sink.config["token"], "secret-token");
        assert_eq!(config.sink.config["channel_id"], "1234");
        assert!(config.sink.config.get("webhook_url").is_none());
        assert_eq!(config.refresh_interval_ms, 2000);
    }

    #[test]
    fn invalid_interval_env_is_an_error() {
        let mut config = AgentConfig::default();
        let result = config.apply_env(|key| {
            (key == "SYSBOARD_REFRESH_INTERVAL_MS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = AgentConfig {
            refresh_interval_ms: 0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_cores_per_line() {
        let mut config = AgentConfig::default();
        config.report.cores_per_line = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "shutdown_grace_ms = 250\n[sink]\ntype = \"console\"\n").unwrap();
        let config = AgentConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.shutdown_grace(), Duration::from_millis(250));
        assert_eq!(config.sink.sink_type, "console");
    }

    #[test]
    fn load_falls_back_to_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = AgentConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.sink.sink_type, "discord");
        assert_eq!(config.shutdown_grace_ms, 5_000);
    }
}

use crate::error::{DeliveryError, Result};
use crate::utils::redact_sensitive_json;
use crate::DeliverySink;
use serde_json::Value;
use std::collections::HashMap;

/// Factory for creating [`DeliverySink`] instances from JSON configuration.
///
/// Each plugin is registered in the [`SinkRegistry`] by its `name()`. The
/// agent picks exactly one plugin by the configured sink type.
pub trait SinkPlugin: Send + Sync {
    /// Returns the plugin type name (e.g., `"discord"`, `"console"`).
    fn name(&self) -> &str;

    /// Validates a JSON config blob against this plugin's expected schema.
    fn validate_config(&self, config: &Value) -> Result<()>;

    /// Creates a configured sink from a validated JSON config.
    fn create_sink(&self, config: &Value) -> Result<Box<dyn DeliverySink>>;

    /// Returns a copy of `config` that is safe to log.
    fn redact_config(&self, config: &Value) -> Value {
        redact_sensitive_json(config)
    }
}

/// Registry of available [`SinkPlugin`]s.
///
/// # Examples
///
/// ```
/// use sysboard_notify::plugin::SinkRegistry;
///
/// let registry = SinkRegistry::default();
/// assert!(registry.has_plugin("discord"));
/// assert!(registry.has_plugin("webhook"));
/// assert!(registry.has_plugin("console"));
/// assert!(!registry.has_plugin("nonexistent"));
/// ```
pub struct SinkRegistry {
    plugins: HashMap<String, Box<dyn SinkPlugin>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn SinkPlugin>) {
        let name = plugin.name().to_string();
        self.plugins.insert(name, plugin);
    }

    pub fn create_sink(&self, type_name: &str, config: &Value) -> Result<Box<dyn DeliverySink>> {
        let plugin = self.plugin(type_name)?;
        plugin.validate_config(config)?;
        plugin.create_sink(config)
    }

    pub fn redact_config(&self, type_name: &str, config: &Value) -> Result<Value> {
        Ok(self.plugin(type_name)?.redact_config(config))
    }

    pub fn has_plugin(&self, type_name: &str) -> bool {
        self.plugins.contains_key(type_name)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.keys().map(|s| s.as_str()).collect()
    }

    fn plugin(&self, type_name: &str) -> Result<&dyn SinkPlugin> {
        self.plugins
            .get(type_name)
            .map(|p| p.as_ref())
            .ok_or_else(|| DeliveryError::UnknownSinkType(type_name.to_string()))
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::sinks::discord::DiscordPlugin));
        registry.register(Box::new(crate::sinks::webhook::WebhookPlugin));
        registry.register(Box::new(crate::sinks::console::ConsolePlugin));
        registry
    }
}

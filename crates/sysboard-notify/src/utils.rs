//! Utility functions for delivery sinks

use serde_json::Value;

/// Maximum length of an API response body kept in error messages
pub const MAX_BODY_LENGTH: usize = 500;

/// Truncate a string to at most `max_chars` characters, marking the cut with `…`.
///
/// Counts characters rather than bytes so multi-byte glyphs (bars, emoji)
/// are never split.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Redact sensitive fields from JSON configuration
///
/// Replaces values for keys containing: token, secret, password, webhook_url
pub fn redact_sensitive_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let key_lower = key.to_lowercase();
                let is_sensitive = key_lower.contains("token")
                    || key_lower.contains("secret")
                    || key_lower.contains("password")
                    || key_lower.contains("webhook_url");

                if is_sensitive {
                    redacted.insert(key.clone(), Value::String("***".to_string()));
                } else if val.is_object() || val.is_array() {
                    redacted.insert(key.clone(), redact_sensitive_json(val));
                } else {
                    redacted.insert(key.clone(), val.clone());
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_json).collect()),
        _ => value.clone(),
    }
}

/// Errors raised while reading host metrics.
///
/// Any variant abandons the current tick; the next tick reads again.
///
/// # Examples
///
/// ```rust
/// use sysboard_collector::error::ProviderError;
///
/// let err = ProviderError::Malformed {
///     field: "cpu.overall",
///     reason: "NaN".to_string(),
/// };
/// assert!(err.to_string().contains("cpu.overall"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The underlying source could not be read at all.
    #[error("Provider: {source_name} unavailable: {message}")]
    Unavailable {
        source_name: &'static str,
        message: String,
    },

    /// The source answered, but with values that cannot be right.
    #[error("Provider: malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
}

/// Convenience `Result` alias for provider reads.
pub type Result<T> = std::result::Result<T, ProviderError>;

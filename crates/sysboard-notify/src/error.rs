/// Errors that can occur while creating or updating the dashboard message.
///
/// # Examples
///
/// ```rust
/// use sysboard_notify::error::DeliveryError;
///
/// let err = DeliveryError::InvalidConfig("missing channel_id".to_string());
/// assert!(err.to_string().contains("channel_id"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Sink configuration is missing a required field or contains an invalid value.
    #[error("Delivery: invalid sink configuration: {0}")]
    InvalidConfig(String),

    /// The sink type is not registered in the sink registry.
    #[error("Delivery: unknown sink type '{0}'")]
    UnknownSinkType(String),

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("Delivery: HTTP request failed: {0}")]
    HttpError(#[source] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("Delivery: API error from {service}: status={status}, body={body}")]
    ApiError {
        service: String,
        status: u16,
        body: String,
    },

    /// The remote API throttled the request.
    #[error("Delivery: {service} rate limited, retry after {retry_after_ms} ms")]
    RateLimited { service: String, retry_after_ms: u64 },

    /// JSON serialization or deserialization failed.
    #[error("Delivery: JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The snapshot could not be rendered into a report.
    #[error("Delivery: render error: {0}")]
    RenderError(String),

    /// Writing to a local stream failed.
    #[error("Delivery: I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for DeliveryError {
    /// Webhook URLs embed their token, so the request URL is never kept.
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::HttpError(err.without_url())
    }
}

/// Convenience `Result` alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

//! Report rendering and delivery for the sysboard agent.
//!
//! A [`report::ReportLayout`] turns a derived snapshot into a [`report::Report`];
//! a [`DeliverySink`] posts it once and then edits the same message on every
//! refresh. Built-in sinks are a Discord bot, a Discord webhook, and the
//! console.

pub mod error;
pub mod plugin;
pub mod report;
pub mod sinks;
pub mod utils;


use async_trait::async_trait;
use error::Result;
use report::Report;
use serde::{Deserialize, Serialize};

/// Opaque reference to a message created by a [`DeliverySink`].
///
/// A handle stays valid after a failed update and is reused on the next one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle(pub String);

impl MessageHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persistent output target that shows the latest report.
///
/// Implementations are created by the matching [`plugin::SinkPlugin`].
/// Neither operation retries; the refresher's next tick is the retry.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Posts the initial message and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be created.
    async fn create(&self, initial: &Report) -> Result<MessageHandle>;

    /// Replaces the content of the message behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edit was rejected or never reached the target.
    async fn update(&self, handle: &MessageHandle, report: &Report) -> Result<()>;

    /// Returns the sink type name (e.g., `"discord"`, `"console"`).
    fn sink_name(&self) -> &str;
}

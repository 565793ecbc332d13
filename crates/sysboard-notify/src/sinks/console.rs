use crate::error::Result;
use crate::plugin::SinkPlugin;
use crate::report::Report;
use crate::{DeliverySink, MessageHandle};
use async_trait::async_trait;
use serde_json::Value;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Writes every report as plain text, for local runs without Discord.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    next_id: AtomicU64,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            next_id: AtomicU64::new(1),
        }
    }

    fn write_report(&self, handle: &MessageHandle, report: &Report) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(out, "── {handle} ──")?;
        out.write_all(report.to_plain_text().as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for ConsoleSink {
    async fn create(&self, initial: &Report) -> Result<MessageHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = MessageHandle(format!("console-{id}"));
        self.write_report(&handle, initial)?;
        Ok(handle)
    }

    async fn update(&self, handle: &MessageHandle, report: &Report) -> Result<()> {
        self.write_report(handle, report)
    }

    fn sink_name(&self) -> &str {
        "console"
    }
}

// Plugin

pub struct ConsolePlugin;

impl SinkPlugin for ConsolePlugin {
    fn name(&self) -> &str {
        "console"
    }

    fn validate_config(&self, _config: &Value) -> Result<()> {
        Ok(())
    }

    fn create_sink(&self, _config: &Value) -> Result<Box<dyn DeliverySink>> {
        Ok(Box::new(ConsoleSink::stdout()))
    }
}

//! The refresh loop: one placeholder message, then one edit per tick.
//!
//! ```text
//! Idle ──initialize()──▶ Initializing ──create ok──▶ Running ──shutdown──▶ Terminated
//!                              └──────create failed──────────────────────────▲
//! ```
//!
//! While running, each tick reads the provider, samples against the carried
//! [`CounterSnapshot`], renders and updates the message. The carried snapshot
//! only moves forward when the whole tick succeeds, so a failed tick leaves
//! the next rate computed against the last delivered sample.

use chrono::{DateTime, Utc};
use std::time::Duration;
use sysboard_collector::error::ProviderError;
use sysboard_collector::{sampler, MetricsProvider};
use sysboard_common::types::{CounterSnapshot, DerivedSnapshot};
use sysboard_notify::error::DeliveryError;
use sysboard_notify::report::ReportLayout;
use sysboard_notify::{DeliverySink, MessageHandle};
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefresherState {
    Idle,
    Initializing,
    Running { handle: MessageHandle },
    Terminated,
}

impl RefresherState {
    pub fn name(&self) -> &'static str {
        match self {
            RefresherState::Idle => "idle",
            RefresherState::Initializing => "initializing",
            RefresherState::Running { .. } => "running",
            RefresherState::Terminated => "terminated",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("metrics read failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("refresher is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

pub struct Refresher {
    provider: Box<dyn MetricsProvider>,
    sink: Box<dyn DeliverySink>,
    layout: ReportLayout,
    period: Duration,
    shutdown_grace: Duration,
    state: RefresherState,
    previous: Option<CounterSnapshot>,
}

impl Refresher {
    pub fn new(
        provider: Box<dyn MetricsProvider>,
        sink: Box<dyn DeliverySink>,
        layout: ReportLayout,
        period: Duration,
    ) -> Self {
        Self {
            provider,
            sink,
            layout,
            period,
            shutdown_grace: Duration::from_secs(5),
            state: RefresherState::Idle,
            previous: None,
        }
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn state(&self) -> &RefresherState {
        &self.state
    }

    /// Counter snapshot of the last successful tick.
    pub fn previous(&self) -> Option<CounterSnapshot> {
        self.previous
    }

    /// Posts the placeholder message.
    ///
    /// # Errors
    ///
    /// A failed `create` is fatal: the refresher moves to `Terminated` and
    /// the delivery error is returned.
    pub async fn initialize(&mut self) -> Result<MessageHandle, RefreshError> {
        if self.state != RefresherState::Idle {
            return Err(RefreshError::InvalidState {
                expected: "idle",
                actual: self.state.name(),
            });
        }
        self.state = RefresherState::Initializing;

        let placeholder = self.layout.placeholder();
        match self.sink.create(&placeholder).await {
            Ok(handle) => {
                tracing::info!(
                    sink = self.sink.sink_name(),
                    handle = %handle,
                    "Dashboard target created"
                );
                self.state = RefresherState::Running {
                    handle: handle.clone(),
                };
                Ok(handle)
            }
            Err(e) => {
                tracing::error!(
                    sink = self.sink.sink_name(),
                    error = %e,
                    "Failed to create dashboard target"
                );
                self.state = RefresherState::Terminated;
                Err(e.into())
            }
        }
    }

    /// Runs one refresh cycle as of `now`.
    ///
    /// # Errors
    ///
    /// Returns the provider, render or delivery error of this tick. The
    /// carried counter snapshot and the message handle are left untouched.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> Result<DerivedSnapshot, RefreshError> {
        let handle = match &self.state {
            RefresherState::Running { handle } => handle.clone(),
            other => {
                return Err(RefreshError::InvalidState {
                    expected: "running",
                    actual: other.name(),
                })
            }
        };

        let raw = self.provider.read_sample()?;
        let (snapshot, counters) = sampler::sample(raw, self.previous, now);
        let report = self.layout.render(&snapshot)?;
        self.sink.update(&handle, &report).await?;

        self.previous = Some(counters);
        Ok(snapshot)
    }

    /// Initializes, then refreshes every period until `shutdown` turns true
    /// (or its sender is dropped).
    ///
    /// Ticks never overlap; ticks missed while one was running are skipped.
    /// A tick still running at shutdown gets the grace period to finish.
    ///
    /// # Errors
    ///
    /// Only initialization errors are returned; tick errors are logged.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), RefreshError> {
        self.initialize().await?;

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            provider = self.provider.name(),
            sink = self.sink.sink_name(),
            interval_ms = self.period.as_millis() as u64,
            "Refresh loop started"
        );

        let mut consecutive_failures = 0u32;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = wait_for_shutdown(&mut shutdown) => break,
            }

            let grace = self.shutdown_grace;
            let (outcome, stopping) = {
                let work = self.tick_at(Utc::now());
                tokio::pin!(work);
                let finished = tokio::select! {
                    res = &mut work => Some(res),
                    _ = wait_for_shutdown(&mut shutdown) => None,
                };
                match finished {
                    Some(res) => (Some(res), false),
                    None => (tokio::time::timeout(grace, &mut work).await.ok(), true),
                }
            };

            match outcome {
                Some(Ok(snapshot)) => {
                    if consecutive_failures > 0 {
                        tracing::info!(
                            failed_ticks = consecutive_failures,
                            "Dashboard refresh recovered"
                        );
                    }
                    consecutive_failures = 0;
                    tracing::debug!(
                        cpu = snapshot.cpu_load_overall,
                        net_down = snapshot.net_down_mbit_per_sec,
                        net_up = snapshot.net_up_mbit_per_sec,
                        "Dashboard refreshed"
                    );
                }
                Some(Err(e)) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        error = %e,
                        consecutive_failures,
                        "Dashboard refresh failed, retrying next tick"
                    );
                }
                None => {
                    tracing::warn!(
                        grace_ms = grace.as_millis() as u64,
                        "In-flight refresh abandoned at shutdown"
                    );
                }
            }

            if stopping {
                break;
            }
        }

        self.state = RefresherState::Terminated;
        tracing::info!("Refresh loop stopped");
        Ok(())
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender also ends the loop.
    let _ = shutdown.wait_for(|stop| *stop).await;
}

//! Host metric collection for the sysboard agent.
//!
//! A [`MetricsProvider`] answers four independent reads (CPU, memory, swap,
//! network counters). [`MetricsProvider::read_sample`] combines them into a
//! validated [`RawSample`], which [`sampler::sample`] turns into the derived
//! snapshot shown on the dashboard.

pub mod cpu;
pub mod error;
pub mod memory;
pub mod network;
pub mod sampler;
pub mod system;

#[cfg(test)]
mod tests;

use error::{ProviderError, Result};
use sysboard_common::types::{CpuLoad, InterfaceCounters, MemoryReading, RawSample, SwapReading};

/// A source of instantaneous host readings.
///
/// Each read may fail independently. The trait requires `Send + Sync` so a
/// provider can live inside the refresher task.
pub trait MetricsProvider: Send + Sync {
    /// Returns the provider name, used for logging.
    fn name(&self) -> &str;

    fn cpu_load(&mut self) -> Result<CpuLoad>;

    fn memory(&mut self) -> Result<MemoryReading>;

    fn swap(&mut self) -> Result<SwapReading>;

    fn network_counters(&mut self) -> Result<Vec<InterfaceCounters>>;

    /// Runs all four reads and validates the combined result.
    ///
    /// # Errors
    ///
    /// Returns the first failing read, or [`ProviderError::Malformed`] when
    /// the values are inconsistent.
    fn read_sample(&mut self) -> Result<RawSample> {
        let cpu = self.cpu_load()?;
        let memory = self.memory()?;
        let swap = self.swap()?;
        let interfaces = self.network_counters()?;

        let cpu = CpuLoad {
            overall: check_percent("cpu.overall", cpu.overall)?,
            per_core: cpu
                .per_core
                .into_iter()
                .map(|load| check_percent("cpu.per_core", load))
                .collect::<Result<Vec<_>>>()?,
        };

        if memory.active_bytes > memory.total_bytes {
            return Err(ProviderError::Malformed {
                field: "memory.active_bytes",
                reason: format!(
                    "{} exceeds total {}",
                    memory.active_bytes, memory.total_bytes
                ),
            });
        }
        if swap.used_bytes > swap.total_bytes && swap.total_bytes > 0 {
            return Err(ProviderError::Malformed {
                field: "swap.used_bytes",
                reason: format!("{} exceeds total {}", swap.used_bytes, swap.total_bytes),
            });
        }

        Ok(RawSample {
            cpu,
            memory,
            swap,
            interfaces,
        })
    }
}

/// Rejects non-finite and negative loads; caps overshoot at 100.
fn check_percent(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProviderError::Malformed {
            field,
            reason: format!("{value} is not a valid percentage"),
        });
    }
    Ok(value.min(100.0))
}

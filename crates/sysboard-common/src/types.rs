use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuLoad {
    /// Overall load across all cores, in percent.
    pub overall: f64,
    pub per_core: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReading {
    pub total_bytes: u64,
    /// Reported as "used" on the dashboard.
    pub active_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Cumulative byte counters of a single network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// One fresh reading from a metrics provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub cpu: CpuLoad,
    pub memory: MemoryReading,
    pub swap: SwapReading,
    pub interfaces: Vec<InterfaceCounters>,
}

impl RawSample {
    /// Sum of rx/tx bytes across all interfaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use sysboard_common::types::{CpuLoad, InterfaceCounters, MemoryReading, RawSample, SwapReading};
    ///
    /// let raw = RawSample {
    ///     cpu: CpuLoad { overall: 0.0, per_core: vec![] },
    ///     memory: MemoryReading { total_bytes: 0, active_bytes: 0, available_bytes: 0 },
    ///     swap: SwapReading { total_bytes: 0, used_bytes: 0 },
    ///     interfaces: vec![
    ///         InterfaceCounters { name: "eth0".into(), rx_bytes: 100, tx_bytes: 10 },
    ///         InterfaceCounters { name: "lo".into(), rx_bytes: 5, tx_bytes: 5 },
    ///     ],
    /// };
    /// assert_eq!(raw.total_counters(), (105, 15));
    /// ```
    pub fn total_counters(&self) -> (u64, u64) {
        self.interfaces.iter().fold((0u64, 0u64), |(rx, tx), iface| {
            (rx.saturating_add(iface.rx_bytes), tx.saturating_add(iface.tx_bytes))
        })
    }
}

/// Network totals carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub total_rx_bytes: u64,
    pub total_tx_bytes: u64,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used_gib: f64,
    pub free_gib: f64,
    pub total_gib: f64,
    pub usage_percent: f64,
}

/// Everything the report needs for one tick. Values keep full precision;
/// rounding happens at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSnapshot {
    pub cpu_load_overall: f64,
    pub per_core_load: Vec<f64>,
    pub ram: MemoryUsage,
    pub swap: MemoryUsage,
    pub net_down_mbit_per_sec: f64,
    pub net_up_mbit_per_sec: f64,
    pub sampled_at: DateTime<Utc>,
}

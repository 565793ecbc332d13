//! Turns one [`RawSample`] into the dashboard's [`DerivedSnapshot`].
//!
//! The sampler holds no state. The caller passes in the counter snapshot
//! returned by the previous call and keeps the one returned by this call.

use chrono::{DateTime, Utc};
use sysboard_common::types::{CounterSnapshot, DerivedSnapshot, MemoryUsage, RawSample};
use sysboard_common::units::{bytes_to_gib, mbit_per_sec, percent_of};

/// Derives a snapshot from `raw` taken at `now`.
///
/// Network rates are 0 when `previous` is `None` or when `now` is not later
/// than `previous`. A counter that went backwards (interface restart)
/// contributes a delta of 0.
pub fn sample(
    raw: RawSample,
    previous: Option<CounterSnapshot>,
    now: DateTime<Utc>,
) -> (DerivedSnapshot, CounterSnapshot) {
    let (total_rx, total_tx) = raw.total_counters();
    let now_ms = now.timestamp_millis();

    let (net_down, net_up) = match previous {
        Some(prev) => {
            let elapsed_ms = now_ms - prev.timestamp_ms;
            let rx_delta = total_rx.saturating_sub(prev.total_rx_bytes);
            let tx_delta = total_tx.saturating_sub(prev.total_tx_bytes);
            if total_rx < prev.total_rx_bytes || total_tx < prev.total_tx_bytes {
                tracing::debug!(
                    prev_rx = prev.total_rx_bytes,
                    rx = total_rx,
                    prev_tx = prev.total_tx_bytes,
                    tx = total_tx,
                    "Network counter went backwards, clamping delta"
                );
            }
            (
                mbit_per_sec(rx_delta, elapsed_ms),
                mbit_per_sec(tx_delta, elapsed_ms),
            )
        }
        None => (0.0, 0.0),
    };

    let mem = raw.memory;
    let ram = MemoryUsage {
        used_gib: bytes_to_gib(mem.active_bytes),
        free_gib: bytes_to_gib(mem.available_bytes),
        total_gib: bytes_to_gib(mem.total_bytes),
        usage_percent: percent_of(mem.active_bytes, mem.total_bytes),
    };

    let swap = raw.swap;
    let swap = MemoryUsage {
        used_gib: bytes_to_gib(swap.used_bytes),
        free_gib: bytes_to_gib(swap.total_bytes.saturating_sub(swap.used_bytes)),
        total_gib: bytes_to_gib(swap.total_bytes),
        usage_percent: percent_of(swap.used_bytes, swap.total_bytes),
    };

    let derived = DerivedSnapshot {
        cpu_load_overall: raw.cpu.overall,
        per_core_load: raw.cpu.per_core,
        ram,
        swap,
        net_down_mbit_per_sec: net_down,
        net_up_mbit_per_sec: net_up,
        sampled_at: now,
    };

    let counters = CounterSnapshot {
        total_rx_bytes: total_rx,
        total_tx_bytes: total_tx,
        timestamp_ms: now_ms,
    };

    (derived, counters)
}

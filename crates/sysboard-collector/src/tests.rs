use crate::error::{ProviderError, Result};
use crate::sampler::sample;
use crate::MetricsProvider;
use chrono::{DateTime, TimeZone, Utc};
use sysboard_common::types::{
    CounterSnapshot, CpuLoad, InterfaceCounters, MemoryReading, RawSample, SwapReading,
};

const GIB: u64 = 1_073_741_824;

fn at_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

fn raw_with_counters(rx: u64, tx: u64) -> RawSample {
    RawSample {
        cpu: CpuLoad {
            overall: 12.5,
            per_core: vec![10.0, 15.0],
        },
        memory: MemoryReading {
            total_bytes: 10 * GIB,
            active_bytes: 5 * GIB,
            available_bytes: 4 * GIB,
        },
        swap: SwapReading {
            total_bytes: 2 * GIB,
            used_bytes: GIB / 2,
        },
        interfaces: vec![
            InterfaceCounters {
                name: "eth0".to_string(),
                rx_bytes: rx,
                tx_bytes: tx,
            },
            InterfaceCounters {
                name: "lo".to_string(),
                rx_bytes: 0,
                tx_bytes: 0,
            },
        ],
    }
}

// ── Sampler ──

#[test]
fn first_sample_reports_zero_rates() {
    let (derived, counters) = sample(raw_with_counters(5_000, 7_000), None, at_ms(1_000));
    assert_eq!(derived.net_down_mbit_per_sec, 0.0);
    assert_eq!(derived.net_up_mbit_per_sec, 0.0);
    assert_eq!(
        counters,
        CounterSnapshot {
            total_rx_bytes: 5_000,
            total_tx_bytes: 7_000,
            timestamp_ms: 1_000,
        }
    );
}

#[test]
fn rate_matches_delta_over_elapsed_time() {
    let (_, prev) = sample(raw_with_counters(1_000, 2_000), None, at_ms(0));
    // 3_750_000 bytes down and 937_500 bytes up over 15 s
    let (derived, _) = sample(
        raw_with_counters(1_000 + 3_750_000, 2_000 + 937_500),
        Some(prev),
        at_ms(15_000),
    );
    assert_eq!(format!("{:.2}", derived.net_down_mbit_per_sec), "2.00");
    assert_eq!(format!("{:.2}", derived.net_up_mbit_per_sec), "0.50");
}

#[test]
fn rate_keeps_full_precision() {
    let (_, prev) = sample(raw_with_counters(0, 0), None, at_ms(0));
    let (derived, _) = sample(raw_with_counters(1_234_567, 0), Some(prev), at_ms(7_000));
    let expected = (1_234_567.0 * 8.0 / 1_000_000.0) / 7.0;
    assert!((derived.net_down_mbit_per_sec - expected).abs() < 1e-12);
    assert_eq!(format!("{:.2}", derived.net_down_mbit_per_sec), "1.41");
}

#[test]
fn zero_elapsed_reports_zero_rates() {
    let (_, prev) = sample(raw_with_counters(0, 0), None, at_ms(5_000));
    let (derived, counters) = sample(raw_with_counters(9_999_999, 9_999_999), Some(prev), at_ms(5_000));
    assert_eq!(derived.net_down_mbit_per_sec, 0.0);
    assert_eq!(derived.net_up_mbit_per_sec, 0.0);
    assert_eq!(counters.total_rx_bytes, 9_999_999);
}

#[test]
fn clock_going_backwards_reports_zero_rates() {
    let (_, prev) = sample(raw_with_counters(0, 0), None, at_ms(10_000));
    let (derived, _) = sample(raw_with_counters(1_000_000, 1_000_000), Some(prev), at_ms(9_000));
    assert_eq!(derived.net_down_mbit_per_sec, 0.0);
    assert_eq!(derived.net_up_mbit_per_sec, 0.0);
}

#[test]
fn counter_regression_is_clamped_to_zero() {
    let (_, prev) = sample(raw_with_counters(50_000_000, 1_000), None, at_ms(0));
    // rx reset by an interface restart, tx keeps growing
    let (derived, counters) = sample(raw_with_counters(10, 1_876_000), Some(prev), at_ms(15_000));
    assert_eq!(derived.net_down_mbit_per_sec, 0.0);
    assert_eq!(format!("{:.2}", derived.net_up_mbit_per_sec), "1.00");
    assert_eq!(counters.total_rx_bytes, 10);
}

#[test]
fn ram_usage_uses_active_bytes() {
    let (derived, _) = sample(raw_with_counters(0, 0), None, at_ms(0));
    assert_eq!(format!("{:.2}", derived.ram.usage_percent), "50.00");
    assert_eq!(derived.ram.used_gib, 5.0);
    assert_eq!(derived.ram.free_gib, 4.0);
    assert_eq!(derived.ram.total_gib, 10.0);
}

#[test]
fn swap_usage_and_free() {
    let (derived, _) = sample(raw_with_counters(0, 0), None, at_ms(0));
    assert_eq!(derived.swap.usage_percent, 25.0);
    assert_eq!(derived.swap.used_gib, 0.5);
    assert_eq!(derived.swap.free_gib, 1.5);
    assert_eq!(derived.swap.total_gib, 2.0);
}

#[test]
fn swap_usage_zero_without_swap() {
    let mut raw = raw_with_counters(0, 0);
    raw.swap = SwapReading {
        total_bytes: 0,
        used_bytes: 4096,
    };
    let (derived, _) = sample(raw, None, at_ms(0));
    assert_eq!(derived.swap.usage_percent, 0.0);
    assert_eq!(derived.swap.free_gib, 0.0);
    assert_eq!(derived.swap.total_gib, 0.0);
}

#[test]
fn cpu_values_pass_through() {
    let (derived, _) = sample(raw_with_counters(0, 0), None, at_ms(42));
    assert_eq!(derived.cpu_load_overall, 12.5);
    assert_eq!(derived.per_core_load, vec![10.0, 15.0]);
    assert_eq!(derived.sampled_at, at_ms(42));
}

// ── Provider validation ──

struct FixedProvider {
    raw: RawSample,
    fail_network: bool,
}

impl MetricsProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn cpu_load(&mut self) -> Result<CpuLoad> {
        Ok(self.raw.cpu.clone())
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        Ok(self.raw.memory)
    }

    fn swap(&mut self) -> Result<SwapReading> {
        Ok(self.raw.swap)
    }

    fn network_counters(&mut self) -> Result<Vec<InterfaceCounters>> {
        if self.fail_network {
            return Err(ProviderError::Unavailable {
                source_name: "network",
                message: "interface list unavailable".to_string(),
            });
        }
        Ok(self.raw.interfaces.clone())
    }
}

#[test]
fn read_sample_combines_all_reads() {
    let raw = raw_with_counters(1, 2);
    let mut provider = FixedProvider {
        raw: raw.clone(),
        fail_network: false,
    };
    assert_eq!(provider.read_sample().unwrap(), raw);
}

#[test]
fn read_sample_propagates_single_read_failure() {
    let mut provider = FixedProvider {
        raw: raw_with_counters(1, 2),
        fail_network: true,
    };
    let err = provider.read_sample().unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Unavailable {
            source_name: "network",
            ..
        }
    ));
}

#[test]
fn read_sample_rejects_nan_cpu() {
    let mut raw = raw_with_counters(0, 0);
    raw.cpu.per_core = vec![1.0, f64::NAN];
    let mut provider = FixedProvider {
        raw,
        fail_network: false,
    };
    let err = provider.read_sample().unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Malformed {
            field: "cpu.per_core",
            ..
        }
    ));
}

#[test]
fn read_sample_caps_cpu_overshoot() {
    let mut raw = raw_with_counters(0, 0);
    raw.cpu.overall = 100.4;
    let mut provider = FixedProvider {
        raw,
        fail_network: false,
    };
    assert_eq!(provider.read_sample().unwrap().cpu.overall, 100.0);
}

#[test]
fn read_sample_rejects_active_above_total() {
    let mut raw = raw_with_counters(0, 0);
    raw.memory.active_bytes = raw.memory.total_bytes + 1;
    let mut provider = FixedProvider {
        raw,
        fail_network: false,
    };
    assert!(provider.read_sample().is_err());
}

#[test]
fn read_sample_allows_swap_used_without_swap_total() {
    let mut raw = raw_with_counters(0, 0);
    raw.swap = SwapReading {
        total_bytes: 0,
        used_bytes: 10,
    };
    let mut provider = FixedProvider {
        raw,
        fail_network: false,
    };
    assert!(provider.read_sample().is_ok());
}

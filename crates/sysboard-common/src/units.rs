//! Byte and rate conversions shared by the sampler and the report renderer.

pub const BYTES_PER_GIB: f64 = 1_073_741_824.0;

/// Converts a byte count to GiB.
///
/// # Examples
///
/// ```
/// use sysboard_common::units::bytes_to_gib;
///
/// assert_eq!(bytes_to_gib(5_368_709_120), 5.0);
/// ```
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// `part / total * 100`, or 0 when `total` is 0.
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Megabits per second for `delta_bytes` transferred over `elapsed_ms`.
///
/// Returns 0 for a non-positive interval.
///
/// # Examples
///
/// ```
/// use sysboard_common::units::mbit_per_sec;
///
/// // 1.875 MB over 15 s
/// assert_eq!(mbit_per_sec(1_875_000, 15_000), 1.0);
/// assert_eq!(mbit_per_sec(1_875_000, 0), 0.0);
/// ```
pub fn mbit_per_sec(delta_bytes: u64, elapsed_ms: i64) -> f64 {
    if elapsed_ms <= 0 {
        return 0.0;
    }
    let mbit = delta_bytes as f64 * 8.0 / 1_000_000.0;
    let secs = elapsed_ms as f64 / 1000.0;
    mbit / secs
}

use sysboard_common::types::{MemoryReading, SwapReading};
use sysinfo::System;

/// sysinfo has no "active" counter; `used_memory` (total minus available)
/// is the closest match and excludes reclaimable cache.
pub fn read_memory(system: &System) -> MemoryReading {
    MemoryReading {
        total_bytes: system.total_memory(),
        active_bytes: system.used_memory(),
        available_bytes: system.available_memory(),
    }
}

pub fn read_swap(system: &System) -> SwapReading {
    SwapReading {
        total_bytes: system.total_swap(),
        used_bytes: system.used_swap(),
    }
}

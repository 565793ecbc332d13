use sysboard_common::types::CpuLoad;
use sysinfo::System;

/// Reads global and per-core usage from an already refreshed [`System`].
pub fn read(system: &System) -> CpuLoad {
    CpuLoad {
        overall: system.global_cpu_usage() as f64,
        per_core: system
            .cpus()
            .iter()
            .map(|cpu| cpu.cpu_usage() as f64)
            .collect(),
    }
}

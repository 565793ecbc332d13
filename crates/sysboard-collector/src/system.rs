use crate::error::{ProviderError, Result};
use crate::{cpu, memory, network, MetricsProvider};
use sysboard_common::types::{CpuLoad, InterfaceCounters, MemoryReading, SwapReading};
use sysinfo::{Networks, System};

/// [`MetricsProvider`] backed by the `sysinfo` crate.
///
/// CPU usage is computed by sysinfo from the difference between two
/// refreshes, so the constructor primes the CPU counters and the first real
/// read should happen at least `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` later.
pub struct SystemProvider {
    system: System,
    networks: Networks,
}

impl SystemProvider {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();
        Self {
            system,
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SystemProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SystemProvider {
    fn name(&self) -> &str {
        "sysinfo"
    }

    fn cpu_load(&mut self) -> Result<CpuLoad> {
        self.system.refresh_cpu_all();
        let load = cpu::read(&self.system);
        if load.per_core.is_empty() {
            return Err(ProviderError::Unavailable {
                source_name: "cpu",
                message: "no CPUs reported".to_string(),
            });
        }
        Ok(load)
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        self.system.refresh_memory();
        let reading = memory::read_memory(&self.system);
        if reading.total_bytes == 0 {
            return Err(ProviderError::Unavailable {
                source_name: "memory",
                message: "total memory reported as 0".to_string(),
            });
        }
        Ok(reading)
    }

    fn swap(&mut self) -> Result<SwapReading> {
        self.system.refresh_memory();
        Ok(memory::read_swap(&self.system))
    }

    fn network_counters(&mut self) -> Result<Vec<InterfaceCounters>> {
        self.networks.refresh(true);
        let counters = network::read(&self.networks);
        tracing::trace!(interfaces = counters.len(), "Network counters read");
        Ok(counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_read_refreshes_on_its_own() {
        let mut provider = SystemProvider {
            system: System::new(),
            networks: Networks::new(),
        };
        let reading = provider.swap().unwrap();

        let mut fresh = System::new();
        fresh.refresh_memory();
        assert_eq!(reading.total_bytes, fresh.total_swap());
        assert!(reading.used_bytes <= reading.total_bytes);
    }
}

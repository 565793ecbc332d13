use sysboard_common::types::InterfaceCounters;
use sysinfo::Networks;

/// Cumulative counters per interface, sorted by name so the order is stable
/// between ticks.
pub fn read(networks: &Networks) -> Vec<InterfaceCounters> {
    let mut counters: Vec<InterfaceCounters> = networks
        .iter()
        .map(|(name, data)| InterfaceCounters {
            name: name.clone(),
            rx_bytes: data.total_received(),
            tx_bytes: data.total_transmitted(),
        })
        .collect();
    counters.sort_by(|a, b| a.name.cmp(&b.name));
    counters
}

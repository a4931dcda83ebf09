use std::time::SystemTime;

use serde::Serialize;

/// Point-in-time counters of one process.
///
/// Every counter is cumulative since process start (network counters since
/// boot, host-wide). `cpu_percent`, `io_read_rate` and `io_write_rate` are
/// derived from the previous sample of the same pid and stay `0` on the first
/// sample of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSample {
    pub timestamp: SystemTime,
    pub pid: u32,
    pub process_name: String,
    /// Start time after boot in clock ticks; identifies the process across pid reuse.
    pub start_time_ticks: u64,

    pub cpu_user_ticks: u64,
    pub cpu_system_ticks: u64,
    pub num_threads: u64,
    pub voluntary_ctx_switches: u64,
    pub nonvoluntary_ctx_switches: u64,

    pub mem_vsize_bytes: u64,
    pub mem_rss_bytes: u64,
    pub mem_shared_bytes: u64,
    pub minor_faults: u64,
    pub major_faults: u64,
    pub swap_bytes: u64,

    pub io_read_bytes: u64,
    pub io_write_bytes: u64,
    pub io_read_syscalls: u64,
    pub io_write_syscalls: u64,
    pub io_cancelled_write_bytes: u64,

    pub net_rx_bytes: u64,
    pub net_tx_bytes: u64,
    pub net_rx_packets: u64,
    pub net_tx_packets: u64,
    /// Open TCP sockets in the network namespace of the process.
    pub net_connections: u64,

    /// CPU time over wall time since the previous sample, in percent of one core.
    pub cpu_percent: f64,
    /// Storage bytes read per second since the previous sample.
    pub io_read_rate: f64,
    /// Storage bytes written per second since the previous sample.
    pub io_write_rate: f64,
}

impl ProcessSample {
    /// Creates a sample with all counters at zero.
    pub fn empty(pid: u32, timestamp: SystemTime) -> Self {
        Self {
            timestamp,
            pid,
            process_name: String::new(),
            start_time_ticks: 0,
            cpu_user_ticks: 0,
            cpu_system_ticks: 0,
            num_threads: 0,
            voluntary_ctx_switches: 0,
            nonvoluntary_ctx_switches: 0,
            mem_vsize_bytes: 0,
            mem_rss_bytes: 0,
            mem_shared_bytes: 0,
            minor_faults: 0,
            major_faults: 0,
            swap_bytes: 0,
            io_read_bytes: 0,
            io_write_bytes: 0,
            io_read_syscalls: 0,
            io_write_syscalls: 0,
            io_cancelled_write_bytes: 0,
            net_rx_bytes: 0,
            net_tx_bytes: 0,
            net_rx_packets: 0,
            net_tx_packets: 0,
            net_connections: 0,
            cpu_percent: 0.0,
            io_read_rate: 0.0,
            io_write_rate: 0.0,
        }
    }

    /// Total CPU time (user + system) in clock ticks.
    pub fn cpu_total_ticks(&self) -> u64 {
        self.cpu_user_ticks.saturating_add(self.cpu_system_ticks)
    }

    /// Returns `true` if `other` describes the same process instance.
    pub fn same_process(&self, other: &ProcessSample) -> bool {
        self.pid == other.pid && self.start_time_ticks == other.start_time_ticks
    }
}

//! Derivation of per-interval rates from two cumulative samples.

use std::time::Duration;

use super::ProcessSample;

/// Turns pairs of consecutive samples into CPU and I/O rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCalculator {
    clock_ticks: u64,
    fallback_interval: Duration,
}

impl RateCalculator {
    /// Creates a calculator for a host with `clock_ticks` ticks per second.
    ///
    /// `fallback_interval` replaces the measured wall-clock delta whenever that
    /// delta is zero or negative (timestamp tie or clock stepping backwards).
    pub fn new(clock_ticks: u64, fallback_interval: Duration) -> Self {
        Self {
            clock_ticks: clock_ticks.max(1),
            fallback_interval: fallback_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    /// Overwrites the derived fields of `current` using `previous` as the baseline.
    ///
    /// Counters that went backwards produce a zero delta rather than wrapping.
    pub fn derive(&self, current: &mut ProcessSample, previous: &ProcessSample) {
        let elapsed = current
            .timestamp
            .duration_since(previous.timestamp)
            .ok()
            .filter(|elapsed| !elapsed.is_zero())
            .unwrap_or(self.fallback_interval);
        let seconds = elapsed.as_secs_f64();

        let cpu_ticks = current
            .cpu_total_ticks()
            .saturating_sub(previous.cpu_total_ticks());
        let cpu_seconds = cpu_ticks as f64 / self.clock_ticks as f64;
        current.cpu_percent = 100.0 * cpu_seconds / seconds;

        let read = current.io_read_bytes.saturating_sub(previous.io_read_bytes);
        let written = current
            .io_write_bytes
            .saturating_sub(previous.io_write_bytes);
        current.io_read_rate = read as f64 / seconds;
        current.io_write_rate = written as f64 / seconds;
    }
}

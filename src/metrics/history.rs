use std::time::{Duration, SystemTime};

use serde::Serialize;

use super::{ProcessSample, RateCalculator};

/// Append-only, timestamp-ordered samples of one monitoring session.
///
/// Rates are derived on append from the last stored sample, so stored samples
/// never change afterwards. Storage grows by doubling its capacity when full.
#[derive(Debug, Clone)]
pub struct MetricsHistory {
    samples: Vec<ProcessSample>,
    calculator: RateCalculator,
}

/// Record handed to exporters: session metadata plus the ordered samples.
#[derive(Debug, Serialize)]
pub struct SessionExport<'a> {
    pub pid: u32,
    pub process_name: &'a str,
    pub start_time: Option<SystemTime>,
    pub sample_count: usize,
    pub samples: &'a [ProcessSample],
}

/// Aggregates over a finished history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub sample_count: usize,
    pub duration: Duration,
    pub mean_cpu_percent: f64,
    pub peak_cpu_percent: f64,
    pub peak_rss_bytes: u64,
    pub total_read_bytes: u64,
    pub total_write_bytes: u64,
}

impl MetricsHistory {
    /// Creates an empty history able to hold `initial_capacity` samples before growing.
    pub fn new(initial_capacity: usize, calculator: RateCalculator) -> Self {
        Self {
            samples: Vec::with_capacity(initial_capacity.max(1)),
            calculator,
        }
    }

    /// Appends `sample`, deriving its rate fields from the previous sample.
    ///
    /// The first sample of a history always has zero rates, as does a sample
    /// whose predecessor belongs to a different process instance.
    pub fn append(&mut self, mut sample: ProcessSample) {
        match self.samples.last() {
            Some(previous) if previous.same_process(&sample) => {
                self.calculator.derive(&mut sample, previous)
            }
            _ => {
                sample.cpu_percent = 0.0;
                sample.io_read_rate = 0.0;
                sample.io_write_rate = 0.0;
            }
        }

        if self.samples.len() == self.samples.capacity() {
            let additional = self.samples.capacity();
            self.samples.reserve_exact(additional);
            log::trace!("Grew history capacity to {}", self.samples.capacity());
        }
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    pub fn first(&self) -> Option<&ProcessSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&ProcessSample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[ProcessSample] {
        &self.samples
    }

    /// Returns the export record for this session.
    pub fn export(&self) -> SessionExport<'_> {
        let first = self.samples.first();
        SessionExport {
            pid: first.map_or(0, |s| s.pid),
            process_name: first.map_or("", |s| s.process_name.as_str()),
            start_time: first.map(|s| s.timestamp),
            sample_count: self.samples.len(),
            samples: &self.samples,
        }
    }

    /// Summarizes the history, or returns `None` if it is empty.
    pub fn summary(&self) -> Option<HistorySummary> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;

        // The first sample carries no rate and is left out of the mean.
        let rated = &self.samples[1..];
        let mean_cpu_percent = if rated.is_empty() {
            0.0
        } else {
            rated.iter().map(|s| s.cpu_percent).sum::<f64>() / rated.len() as f64
        };

        Some(HistorySummary {
            sample_count: self.samples.len(),
            duration: last
                .timestamp
                .duration_since(first.timestamp)
                .unwrap_or_default(),
            mean_cpu_percent,
            peak_cpu_percent: rated.iter().map(|s| s.cpu_percent).fold(0.0, f64::max),
            peak_rss_bytes: self.samples.iter().map(|s| s.mem_rss_bytes).max().unwrap_or(0),
            total_read_bytes: last.io_read_bytes.saturating_sub(first.io_read_bytes),
            total_write_bytes: last.io_write_bytes.saturating_sub(first.io_write_bytes),
        })
    }
}

//! Bounded, cancellable sampling of one process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::{Error, MetricsHistory, MetricsSampler, RateCalculator, Result};

/// Longest uninterrupted sleep between two checks of the stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// What bounds a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLimit {
    /// Stop once this much wall time has passed since the first sample.
    Duration(Duration),
    /// Stop after this many samples (at least one is always taken).
    Samples(usize),
    /// Run until the stop flag is raised or the process exits.
    UntilStopped,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    LimitReached,
    Stopped,
    ProcessExited,
    /// The pid now belongs to a different process than the one first sampled.
    PidReused,
    /// A later sample failed for a reason other than the process exiting.
    Failed(String),
}

/// A finished session. The history is kept whatever the reason for ending.
#[derive(Debug)]
pub struct CompletedSession {
    pub history: MetricsHistory,
    pub end: SessionEnd,
}

/// Repeated sampling of one pid at a fixed interval.
#[derive(Debug, Clone)]
pub struct Session {
    interval: Duration,
    limit: SessionLimit,
    initial_capacity: usize,
}

impl Session {
    pub fn new(interval: Duration, limit: SessionLimit) -> Self {
        Self {
            interval,
            limit,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Sets the number of samples the history holds before its first reallocation.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Samples `pid` until the limit is reached, `stop` is raised or the process goes away.
    ///
    /// Blocks the calling thread for the whole session.
    ///
    /// # Errors
    ///
    /// Only the first sample can fail the call: [`Error::ProcessNotFound`] if
    /// the process does not exist when the session starts. Later failures end
    /// the session and are reported through [`CompletedSession::end`].
    pub fn run(
        &self,
        sampler: &MetricsSampler,
        pid: u32,
        stop: &AtomicBool,
    ) -> Result<CompletedSession> {
        let calculator = RateCalculator::new(sampler.environment().clock_ticks(), self.interval);
        let mut history = MetricsHistory::new(self.initial_capacity, calculator);

        let started = Instant::now();
        let first = sampler.sample(pid)?;
        let start_time_ticks = first.start_time_ticks;
        log::info!(
            "Started sampling pid {pid} ({}) every {:?}",
            first.process_name,
            self.interval
        );
        history.append(first);

        let end = loop {
            if self.limit_reached(&history, started) {
                break SessionEnd::LimitReached;
            }
            if !sleep_unless_stopped(self.interval, stop) {
                break SessionEnd::Stopped;
            }

            match sampler.sample(pid) {
                Ok(sample) if sample.start_time_ticks != start_time_ticks => {
                    log::warn!(
                        "Pid {pid} was reused (start time {} -> {}), ending session",
                        start_time_ticks,
                        sample.start_time_ticks
                    );
                    break SessionEnd::PidReused;
                }
                Ok(sample) => history.append(sample),
                Err(Error::ProcessNotFound { .. }) => {
                    log::info!("Process {pid} exited, ending session");
                    break SessionEnd::ProcessExited;
                }
                Err(err) => {
                    log::error!("Ending session: {err}");
                    break SessionEnd::Failed(err.to_string());
                }
            }
        };

        log::debug!(
            "Session for pid {pid} ended ({end:?}) after {} samples",
            history.len()
        );
        Ok(CompletedSession { history, end })
    }

    fn limit_reached(&self, history: &MetricsHistory, started: Instant) -> bool {
        match self.limit {
            SessionLimit::Duration(duration) => started.elapsed() >= duration,
            SessionLimit::Samples(count) => history.len() >= count,
            SessionLimit::UntilStopped => false,
        }
    }
}

/// Sleeps for `interval` in slices, returning `false` as soon as `stop` is raised.
fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        std::thread::sleep(remaining.min(STOP_POLL_INTERVAL));
    }
}

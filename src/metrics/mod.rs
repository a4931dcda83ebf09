//! Per-process sampling, rate derivation and session history.
//!
//! Data flows one way: [`MetricsSampler`] reads counters into a
//! [`ProcessSample`], [`MetricsHistory::append`] derives rates through a
//! [`RateCalculator`] and stores the sample, and [`MetricsHistory::export`]
//! hands the ordered samples to an exporter. [`Session`] drives that loop at a
//! fixed interval.
mod error;
mod history;
mod rate;
mod sample;
mod sampler;
mod session;

pub use error::{Error, Result};
pub use history::{HistorySummary, MetricsHistory, SessionExport};
pub use rate::RateCalculator;
pub use sample::ProcessSample;
pub use sampler::MetricsSampler;
pub use session::{CompletedSession, Session, SessionEnd, SessionLimit};

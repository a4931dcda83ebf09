//! Runtime configuration of the `isolation-probe` binary, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::metrics::SessionLimit;
use crate::procfs::DEFAULT_PROC_ROOT;

pub const PID_VAR: &str = "ISOLATION_PROBE_PID";
pub const INTERVAL_VAR: &str = "ISOLATION_PROBE_INTERVAL_MS";
pub const DURATION_VAR: &str = "ISOLATION_PROBE_DURATION_SECS";
pub const SAMPLES_VAR: &str = "ISOLATION_PROBE_SAMPLES";
pub const PROC_ROOT_VAR: &str = "ISOLATION_PROBE_PROC_ROOT";
pub const CGROUP_ROOT_VAR: &str = "ISOLATION_PROBE_CGROUP_ROOT";

const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment variable `{var}` must be set")]
    Missing { var: &'static str },
    #[error("invalid value `{value}` for `{var}`: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("`ISOLATION_PROBE_DURATION_SECS` and `ISOLATION_PROBE_SAMPLES` are mutually exclusive")]
    ConflictingLimits,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Settings of one monitoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub pid: u32,
    pub interval: Duration,
    pub limit: SessionLimit,
    pub proc_root: PathBuf,
    /// `None` means: detect from the mountinfo of the running process.
    pub cgroup_root: Option<PathBuf>,
}

impl MonitorConfig {
    /// Reads the `ISOLATION_PROBE_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Missing`] without a pid, [`Error::Invalid`] for values
    /// that do not parse (or a zero interval) and [`Error::ConflictingLimits`]
    /// if both a duration and a sample count are given.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pid = lookup(PID_VAR)
            .ok_or(Error::Missing { var: PID_VAR })
            .and_then(|value| parse_number::<u32>(PID_VAR, value))?;

        let interval = match lookup(INTERVAL_VAR) {
            Some(value) => match parse_number::<u64>(INTERVAL_VAR, value.clone())? {
                0 => {
                    return Err(Error::Invalid {
                        var: INTERVAL_VAR,
                        value,
                        reason: "the interval must be positive",
                    });
                }
                ms => Duration::from_millis(ms),
            },
            None => DEFAULT_INTERVAL,
        };

        let duration = lookup(DURATION_VAR)
            .map(|value| parse_number::<u64>(DURATION_VAR, value))
            .transpose()?;
        let samples = lookup(SAMPLES_VAR)
            .map(|value| parse_number::<usize>(SAMPLES_VAR, value))
            .transpose()?;
        let limit = match (duration, samples) {
            (Some(_), Some(_)) => return Err(Error::ConflictingLimits),
            (Some(secs), None) => SessionLimit::Duration(Duration::from_secs(secs)),
            (None, Some(count)) => SessionLimit::Samples(count),
            (None, None) => SessionLimit::UntilStopped,
        };

        Ok(Self {
            pid,
            interval,
            limit,
            proc_root: lookup(PROC_ROOT_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT)),
            cgroup_root: lookup(CGROUP_ROOT_VAR).map(PathBuf::from),
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Invalid {
        var,
        value,
        reason: "expected a non-negative integer",
    })
}

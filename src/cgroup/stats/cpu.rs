//! CPU accounting (`cpu.stat`) and bandwidth limits (`cpu.max`) of a cgroup.
//!
//! `cpu.stat` holds one `key value` pair per line, all values in microseconds
//! or counts. Keys are unique; unknown keys (e.g. `core_sched.force_idle_usec`)
//! are ignored.
//!
//! `cpu.max` holds `<quota> <period>`, where quota is either a number of
//! microseconds or `max` for no limit. The same text format is used when
//! writing a limit, so [`CpuLimit`] both parses and displays it.
//!
//! # Examples
//!
//! ```rust
//! use isolation_probe::cgroup::stats::{CpuLimit, CpuStat};
//! use isolation_probe::statfile::{KeyValueStat, SingleLineStat};
//!
//! let stat = CpuStat::from_reader(&mut "usage_usec 1000\nnr_periods 10\nnr_throttled 2\n".as_bytes()).unwrap();
//! assert!(stat.nr_periods >= stat.nr_throttled);
//!
//! let limit = CpuLimit::from_reader(&mut "max 100000\n".as_bytes()).unwrap();
//! assert!(limit.is_unlimited());
//! assert_eq!(CpuLimit::new(25_000, 100_000).to_string(), "25000 100000");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::sync::LazyLock;

use crate::statfile::{KeyValueStat, SingleLineStat, parse_decimal, parse_max_or_decimal};

/// Parsed `cpu.stat` of a cgroup.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct CpuStat {
    /// Total CPU time consumed by the group (user + system), in microseconds.
    pub usage_usec: u64,
    pub user_usec: u64,
    pub system_usec: u64,
    /// Enforcement periods that elapsed while the group had runnable tasks.
    pub nr_periods: u64,
    /// Periods in which the group exhausted its quota.
    pub nr_throttled: u64,
    /// Total time the group's tasks spent throttled, in microseconds.
    pub throttled_usec: u64,
    pub nr_bursts: u64,
    pub burst_usec: u64,
}

impl CpuStat {
    /// Share of elapsed periods in which the group was throttled, or `0.0`
    /// if no period has elapsed.
    pub fn throttled_ratio(&self) -> f64 {
        if self.nr_periods == 0 {
            0.0
        } else {
            self.nr_throttled as f64 / self.nr_periods as f64
        }
    }
}

type Setter = fn(&mut CpuStat, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(8);

    m.insert("usage_usec", |s, v| s.usage_usec = v);
    m.insert("user_usec", |s, v| s.user_usec = v);
    m.insert("system_usec", |s, v| s.system_usec = v);
    m.insert("nr_periods", |s, v| s.nr_periods = v);
    m.insert("nr_throttled", |s, v| s.nr_throttled = v);
    m.insert("throttled_usec", |s, v| s.throttled_usec = v);
    m.insert("nr_bursts", |s, v| s.nr_bursts = v);
    m.insert("burst_usec", |s, v| s.burst_usec = v);

    m
});

impl KeyValueStat for CpuStat {
    const SPLIT_CHAR: Option<char> = None;
    const SKIP_LINES: usize = 0;
    const SKIP_VALUES: usize = 0;
    const ALLOW_DUPLICATE_KEYS: bool = false;
    const ALLOW_MULTIPLE_KV_PER_LINE: bool = false;

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

/// Default enforcement period of the kernel, in microseconds.
pub const DEFAULT_PERIOD: u64 = 100_000;

/// CPU bandwidth limit as stored in `cpu.max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CpuLimit {
    /// Maximum CPU time per period in microseconds; `None` means unlimited (`max`).
    pub quota: Option<u64>,
    /// Length of the enforcement period in microseconds.
    pub period: u64,
}

impl Default for CpuLimit {
    fn default() -> Self {
        Self::unlimited(DEFAULT_PERIOD)
    }
}

impl CpuLimit {
    /// A limit of `quota` microseconds every `period` microseconds.
    pub fn new(quota: u64, period: u64) -> Self {
        Self {
            quota: Some(quota),
            period,
        }
    }

    /// No quota, with the given period.
    pub fn unlimited(period: u64) -> Self {
        Self {
            quota: None,
            period,
        }
    }

    /// Builds a limit from a signed quota where any negative value (conventionally
    /// `-1`) means unlimited. A quota of `0` stays an explicit, tiny quota.
    pub fn from_micros(quota: i64, period: u64) -> Self {
        match u64::try_from(quota) {
            Ok(quota) => Self::new(quota, period),
            Err(_) => Self::unlimited(period),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.quota.is_none()
    }

    /// The fraction of one CPU the limit allows, or `None` when unlimited.
    pub fn cpus(&self) -> Option<f64> {
        let quota = self.quota?;
        (self.period > 0).then(|| quota as f64 / self.period as f64)
    }
}

impl fmt::Display for CpuLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quota {
            Some(quota) => write!(f, "{quota} {}", self.period),
            None => write!(f, "max {}", self.period),
        }
    }
}

impl SingleLineStat for CpuLimit {
    /// Parses `<quota> <period>` where quota may be `max`.
    ///
    /// An empty file or a missing period falls back to `max` and
    /// [`DEFAULT_PERIOD`]; a non-numeric quota or period is an error.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        let mut parts = line.split_whitespace();

        let quota = match parts.next() {
            Some(quota) => parse_max_or_decimal(quota, 1)?,
            None => None,
        };
        let period = match parts.next() {
            Some(period) => parse_decimal(period, 1)?,
            None => DEFAULT_PERIOD,
        };

        Ok(CpuLimit { quota, period })
    }
}

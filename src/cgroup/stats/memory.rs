//! Memory accounting of a cgroup.
//!
//! Four files contribute to a [`MemoryStat`]:
//!
//! - `memory.current`: a single decimal, parsed into [`MemoryUsage`].
//! - `memory.peak`: same format, absent on kernels before 5.19.
//! - `memory.max`: a decimal or the literal `max`, parsed into [`MemoryLimit`].
//! - `memory.stat`: `key value` lines, of which [`MemoryBreakdown`] keeps a few.
//!
//! In [`MemoryStat`] an unlimited group reports `max == 0`. The `max` sentinel is
//! matched before any numeric parse, so it can never be mistaken for a malformed
//! number, and callers must not read `0` as "no memory allowed".
//!
//! # Examples
//!
//! ```rust
//! use isolation_probe::cgroup::stats::{MemoryBreakdown, MemoryLimit, MemoryStat, MemoryUsage};
//! use isolation_probe::statfile::{KeyValueStat, SingleLineStat};
//!
//! let usage = MemoryUsage::from_reader(&mut "8192\n".as_bytes()).unwrap();
//! let limit = MemoryLimit::from_reader(&mut "max\n".as_bytes()).unwrap();
//! let breakdown = MemoryBreakdown::from_reader(&mut "anon 4096\nfile 4096\n".as_bytes()).unwrap();
//!
//! let stat = MemoryStat::derive(&usage, &limit, None, &breakdown);
//! assert_eq!(stat.max, 0);
//! assert!(stat.is_unlimited());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::sync::LazyLock;

use crate::statfile::{KeyValueStat, SingleLineStat, parse_decimal, parse_max_or_decimal};

/// Selected counters of `memory.stat`, in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct MemoryBreakdown {
    /// Anonymous memory (heap, stacks, private mappings).
    pub anon: u64,
    /// Page cache.
    pub file: u64,
    pub kernel_stack: u64,
    pub slab: u64,
    pub sock: u64,
    pub shmem: u64,
    pub file_mapped: u64,
}

type Setter = fn(&mut MemoryBreakdown, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(7);

    m.insert("anon", |s, v| s.anon = v);
    m.insert("file", |s, v| s.file = v);
    m.insert("kernel_stack", |s, v| s.kernel_stack = v);
    m.insert("slab", |s, v| s.slab = v);
    m.insert("sock", |s, v| s.sock = v);
    m.insert("shmem", |s, v| s.shmem = v);
    m.insert("file_mapped", |s, v| s.file_mapped = v);

    m
});

impl KeyValueStat for MemoryBreakdown {
    const SPLIT_CHAR: Option<char> = None;
    const SKIP_LINES: usize = 0;
    const SKIP_VALUES: usize = 0;
    const ALLOW_DUPLICATE_KEYS: bool = false;
    const ALLOW_MULTIPLE_KV_PER_LINE: bool = false;

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

/// A single byte count such as `memory.current` or `memory.peak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub usage_bytes: u64,
}

impl SingleLineStat for MemoryUsage {
    /// # Errors
    ///
    /// Returns an error of kind `InvalidData` if the value is not a `u64`.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        Ok(MemoryUsage {
            usage_bytes: parse_decimal(line.trim(), 1)?,
        })
    }
}

/// Memory limit as stored in `memory.max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct MemoryLimit {
    /// Limit in bytes; `None` means unlimited (`max`).
    pub limit_bytes: Option<u64>,
}

impl MemoryLimit {
    pub fn bytes(limit: u64) -> Self {
        Self {
            limit_bytes: Some(limit),
        }
    }

    pub fn unlimited() -> Self {
        Self { limit_bytes: None }
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit_bytes {
            Some(limit) => write!(f, "{limit}"),
            None => f.write_str("max"),
        }
    }
}

impl SingleLineStat for MemoryLimit {
    /// Parses `max` or a decimal byte count. An empty file reads as unlimited.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `InvalidData` for any other content.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        let limit_bytes = match line.trim() {
            "" => None,
            value => parse_max_or_decimal(value, 1)?,
        };

        Ok(MemoryLimit { limit_bytes })
    }
}

/// Structured memory view of a cgroup.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct MemoryStat {
    /// Current usage in bytes.
    pub current: u64,
    /// Limit in bytes; `0` means unlimited.
    pub max: u64,
    /// Highest recorded usage in bytes, `0` if the kernel does not track it.
    pub peak: u64,
    pub anon: u64,
    pub file: u64,
}

impl MemoryStat {
    /// Combines the individual memory files into one record.
    pub fn derive(
        usage: &MemoryUsage,
        limit: &MemoryLimit,
        peak: Option<&MemoryUsage>,
        breakdown: &MemoryBreakdown,
    ) -> Self {
        Self {
            current: usage.usage_bytes,
            max: limit.limit_bytes.unwrap_or(0),
            peak: peak.map_or(0, |p| p.usage_bytes),
            anon: breakdown.anon,
            file: breakdown.file,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.max == 0
    }
}

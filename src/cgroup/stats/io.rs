//! Block I/O accounting (`io.stat`) of a cgroup.
//!
//! Each line names one backing device and carries `key=value` pairs:
//!
//! ```text
//! 8:0 rbytes=1024 wbytes=2048 rios=12 wios=24 dbytes=0 dios=0
//! ```
//!
//! Values of the same key are summed across all device lines. Pairs without
//! `=` and unknown keys are skipped.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::statfile::KeyValueStat;

/// `io.stat` totals across every device of a cgroup.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct IoStat {
    pub rbytes: u64,
    pub wbytes: u64,
    pub rios: u64,
    pub wios: u64,
}

type Accumulator = fn(&mut IoStat, u64);

static ACCUMULATORS: LazyLock<HashMap<&'static str, Accumulator>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Accumulator> = HashMap::with_capacity(4);

    m.insert("rbytes", |s, v| s.rbytes = s.rbytes.saturating_add(v));
    m.insert("wbytes", |s, v| s.wbytes = s.wbytes.saturating_add(v));
    m.insert("rios", |s, v| s.rios = s.rios.saturating_add(v));
    m.insert("wios", |s, v| s.wios = s.wios.saturating_add(v));

    m
});

impl KeyValueStat for IoStat {
    const SPLIT_CHAR: Option<char> = Some('=');
    const SKIP_LINES: usize = 0;
    const SKIP_VALUES: usize = 1;
    const ALLOW_DUPLICATE_KEYS: bool = true;
    const ALLOW_MULTIPLE_KV_PER_LINE: bool = true;

    #[inline]
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &ACCUMULATORS
    }
}

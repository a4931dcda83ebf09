//! Parser for the counters of `/proc/<pid>/status` that `stat` does not carry.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::statfile::KeyValueStat;

/// Context switch and swap counters from `/proc/<pid>/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcStatus {
    pub voluntary_ctxt_switches: u64,
    pub nonvoluntary_ctxt_switches: u64,
    /// Swapped-out anonymous memory in kB. Kernel threads omit the line.
    pub vm_swap_kb: u64,
}

type Setter = fn(&mut ProcStatus, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(3);

    m.insert("voluntary_ctxt_switches", |s, v| s.voluntary_ctxt_switches = v);
    m.insert("nonvoluntary_ctxt_switches", |s, v| {
        s.nonvoluntary_ctxt_switches = v
    });
    m.insert("VmSwap", |s, v| s.vm_swap_kb = v);

    m
});

impl KeyValueStat for ProcStatus {
    const SPLIT_CHAR: Option<char> = None;
    const SKIP_LINES: usize = 0;
    const SKIP_VALUES: usize = 0;
    const ALLOW_DUPLICATE_KEYS: bool = false;
    const ALLOW_MULTIPLE_KV_PER_LINE: bool = false;
    const KEY_SUFFIX: &'static str = ":";

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

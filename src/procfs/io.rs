//! Parser for `/proc/<pid>/io`.
//!
//! Reading another user's `io` file requires `PTRACE_MODE_READ` access, so
//! callers treat a failure here as a missing secondary source.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::statfile::KeyValueStat;

/// Cumulative I/O accounting for one process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcIo {
    /// Bytes passed to `read(2)` and similar, including page cache hits.
    pub rchar: u64,
    /// Bytes passed to `write(2)` and similar.
    pub wchar: u64,
    pub syscr: u64,
    pub syscw: u64,
    /// Bytes actually fetched from the storage layer.
    pub read_bytes: u64,
    /// Bytes actually sent to the storage layer.
    pub write_bytes: u64,
    /// Bytes whose write-out was cancelled by truncation.
    pub cancelled_write_bytes: u64,
}

type Setter = fn(&mut ProcIo, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(7);

    m.insert("rchar", |s, v| s.rchar = v);
    m.insert("wchar", |s, v| s.wchar = v);
    m.insert("syscr", |s, v| s.syscr = v);
    m.insert("syscw", |s, v| s.syscw = v);
    m.insert("read_bytes", |s, v| s.read_bytes = v);
    m.insert("write_bytes", |s, v| s.write_bytes = v);
    m.insert("cancelled_write_bytes", |s, v| s.cancelled_write_bytes = v);

    m
});

impl KeyValueStat for ProcIo {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statfile::{StatParseError, extract_stat_parse_error};

    #[test]
    fn test_parse_complete_io() {
        let data = "\
rchar: 323934931
wchar: 323929600
syscr: 632687
syscw: 632675
read_bytes: 8192
write_bytes: 323932160
cancelled_write_bytes: 4096
";
        let io = ProcIo::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(io.rchar, 323_934_931);
        assert_eq!(io.wchar, 323_929_600);
        assert_eq!(io.syscr, 632_687);
        assert_eq!(io.syscw, 632_675);
        assert_eq!(io.read_bytes, 8192);
        assert_eq!(io.write_bytes, 323_932_160);
        assert_eq!(io.cancelled_write_bytes, 4096);
    }

    #[test]
    fn test_duplicate_io_field() {
        let data = "read_bytes: 1\nread_bytes: 2\n";
        let err = ProcIo::from_reader(&mut data.as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::DuplicateField { field, line } => {
                assert_eq!(field, "read_bytes");
                assert_eq!(*line, 2);
            }
            other => panic!("Expected DuplicateField error, got {other:?}"),
        }
    }
}

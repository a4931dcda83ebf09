//! Parser for `/proc/<pid>/stat`.
//!
//! The second field is the command name in parentheses and may itself contain
//! spaces or `)`. Everything after the *last* `)` is a flat list of
//! space-separated fields, which this parser indexes relative to the state
//! field (see [`proc_pid_stat(5)`](https://man7.org/linux/man-pages/man5/proc_pid_stat.5.html)).

use std::io::BufRead;

use crate::statfile::{SingleLineStat, StatParseError};

// Offsets into the fields following the closing parenthesis (state is 0).
const STATE: usize = 0;
const MINFLT: usize = 7;
const MAJFLT: usize = 9;
const UTIME: usize = 11;
const STIME: usize = 12;
const NUM_THREADS: usize = 17;
const STARTTIME: usize = 19;
const VSIZE: usize = 20;
const RSS: usize = 21;

/// Scheduling and memory counters from `/proc/<pid>/stat`.
///
/// Times are in clock ticks, `vsize` in bytes and `rss_pages` in pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcStat {
    pub comm: String,
    pub state: char,
    pub minflt: u64,
    pub majflt: u64,
    pub utime: u64,
    pub stime: u64,
    pub num_threads: u64,
    /// Time the process started after system boot, in clock ticks.
    pub starttime: u64,
    pub vsize: u64,
    pub rss_pages: u64,
}

fn malformed(reason: impl Into<String>) -> std::io::Error {
    StatParseError::MalformedLine {
        line: 1,
        reason: reason.into(),
    }
    .into()
}

fn numeric_field(fields: &[&str], index: usize, key: &str) -> std::io::Result<u64> {
    let value = fields
        .get(index)
        .ok_or_else(|| malformed(format!("missing field `{key}`")))?;

    // rss is signed in the kernel's format string; a negative value is clamped.
    if value
        .strip_prefix('-')
        .is_some_and(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
    {
        return Ok(0);
    }

    value.parse::<u64>().map_err(|source| {
        StatParseError::InvalidKeyValue {
            key: key.to_owned(),
            value: (*value).to_owned(),
            line: 1,
            source,
        }
        .into()
    })
}

impl SingleLineStat for ProcStat {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;

        let open = line
            .find('(')
            .ok_or_else(|| malformed("missing `(` before command name"))?;
        let close = line
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| malformed("missing `)` after command name"))?;

        let comm = line[open + 1..close].to_owned();
        let fields: Vec<&str> = line[close + 1..].split_whitespace().collect();

        let state = fields
            .get(STATE)
            .and_then(|s| s.chars().next())
            .ok_or_else(|| malformed("missing field `state`"))?;

        Ok(ProcStat {
            comm,
            state,
            minflt: numeric_field(&fields, MINFLT, "minflt")?,
            majflt: numeric_field(&fields, MAJFLT, "majflt")?,
            utime: numeric_field(&fields, UTIME, "utime")?,
            stime: numeric_field(&fields, STIME, "stime")?,
            num_threads: numeric_field(&fields, NUM_THREADS, "num_threads")?,
            starttime: numeric_field(&fields, STARTTIME, "starttime")?,
            vsize: numeric_field(&fields, VSIZE, "vsize")?,
            rss_pages: numeric_field(&fields, RSS, "rss")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statfile::extract_stat_parse_error;

    const BASH_STAT: &str = "1234 (bash) S 1 1234 1234 34816 5678 4194304 2500 9000 12 40 150 75 30 10 20 0 1 0 987654 23871488 1320 18446744073709551615 1 1 0 0 0 0 65536 3670020 1266777851 0 0 0 17 3 0 0 0 0 0\n";

    #[test]
    fn test_parse_complete_stat() {
        let stat = ProcStat::from_reader(&mut BASH_STAT.as_bytes()).unwrap();
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.minflt, 2500);
        assert_eq!(stat.majflt, 12);
        assert_eq!(stat.utime, 150);
        assert_eq!(stat.stime, 75);
        assert_eq!(stat.num_threads, 1);
        assert_eq!(stat.starttime, 987654);
        assert_eq!(stat.vsize, 23871488);
        assert_eq!(stat.rss_pages, 1320);
    }

    #[test]
    fn test_parse_comm_with_spaces_and_parens() {
        let data = BASH_STAT.replace("(bash)", "(tmux: server) (x))");
        let stat = ProcStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.comm, "tmux: server) (x)");
        assert_eq!(stat.utime, 150);
        assert_eq!(stat.starttime, 987654);
    }

    #[test]
    fn test_parse_truncated_stat() {
        let data = "1234 (bash) S 1 1234 1234 34816\n";
        let err = ProcStat::from_reader(&mut data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        match extract_stat_parse_error(&err) {
            StatParseError::MalformedLine { reason, .. } => {
                assert_eq!(reason, "missing field `minflt`")
            }
            other => panic!("Expected MalformedLine error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_parenthesis() {
        let err = ProcStat::from_reader(&mut "1234 bash S 1\n".as_bytes()).unwrap_err();
        assert!(matches!(
            extract_stat_parse_error(&err),
            StatParseError::MalformedLine { .. }
        ));
    }

    #[test]
    fn test_parse_invalid_counter() {
        let data = BASH_STAT.replace(" 150 75 ", " abc 75 ");
        let err = ProcStat::from_reader(&mut data.as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidKeyValue { key, value, .. } => {
                assert_eq!(key, "utime");
                assert_eq!(value, "abc");
            }
            other => panic!("Expected InvalidKeyValue error, got {other:?}"),
        }
    }
}

use std::fmt;
use std::io::BufRead;

use crate::statfile::{SingleLineStat, parse_decimal, parse_max_or_decimal};

/// Task count limit as stored in `pids.max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct PidsLimit {
    /// Maximum number of tasks; `None` means unlimited (`max`).
    pub max: Option<u64>,
}

impl PidsLimit {
    pub fn count(max: u64) -> Self {
        Self { max: Some(max) }
    }

    pub fn unlimited() -> Self {
        Self { max: None }
    }
}

impl fmt::Display for PidsLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{max}"),
            None => f.write_str("max"),
        }
    }
}

impl SingleLineStat for PidsLimit {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        Ok(PidsLimit {
            max: parse_max_or_decimal(line.trim(), 1)?,
        })
    }
}

/// Number of tasks currently in a group (`pids.current`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PidsCurrent(pub u64);

impl SingleLineStat for PidsCurrent {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        parse_decimal(line.trim(), 1).map(PidsCurrent)
    }
}

/// Task accounting of a cgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct PidsStat {
    pub current: u64,
    /// `None` when unlimited.
    pub max: Option<u64>,
}

impl PidsStat {
    pub fn derive(current: PidsCurrent, limit: PidsLimit) -> Self {
        Self {
            current: current.0,
            max: limit.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pids_limit() {
        let limit = PidsLimit::from_reader(&mut "max\n".as_bytes()).unwrap();
        assert_eq!(limit, PidsLimit::unlimited());

        let limit = PidsLimit::from_reader(&mut "64\n".as_bytes()).unwrap();
        assert_eq!(limit, PidsLimit::count(64));
        assert_eq!(limit.to_string(), "64");
    }

    #[test]
    fn test_parse_pids_current() {
        let current = PidsCurrent::from_reader(&mut "3\n".as_bytes()).unwrap();
        let stat = PidsStat::derive(current, PidsLimit::count(10));
        assert_eq!(
            stat,
            PidsStat {
                current: 3,
                max: Some(10),
            }
        );

        assert!(PidsCurrent::from_reader(&mut "three\n".as_bytes()).is_err());
    }
}

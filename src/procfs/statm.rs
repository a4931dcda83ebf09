use std::io::BufRead;

use crate::statfile::{SingleLineStat, StatParseError, parse_decimal};

/// Memory sizes from `/proc/<pid>/statm`, in pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcStatm {
    pub size: u64,
    pub resident: u64,
    pub shared: u64,
}

impl SingleLineStat for ProcStatm {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;

        let mut fields = line.split_whitespace();
        let mut next = |name: &str| -> std::io::Result<u64> {
            let value = fields.next().ok_or_else(|| {
                std::io::Error::from(StatParseError::MalformedLine {
                    line: 1,
                    reason: format!("missing field `{name}`"),
                })
            })?;
            parse_decimal(value, 1)
        };

        Ok(ProcStatm {
            size: next("size")?,
            resident: next("resident")?,
            shared: next("shared")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statfile::extract_stat_parse_error;

    #[test]
    fn test_parse_statm() {
        let statm = ProcStatm::from_reader(&mut "5828 1320 904 244 0 419 0\n".as_bytes()).unwrap();
        assert_eq!(
            statm,
            ProcStatm {
                size: 5828,
                resident: 1320,
                shared: 904,
            }
        );
    }

    #[test]
    fn test_parse_short_statm() {
        let err = ProcStatm::from_reader(&mut "5828 1320\n".as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::MalformedLine { reason, .. } => {
                assert_eq!(reason, "missing field `shared`")
            }
            other => panic!("Expected MalformedLine error, got {other:?}"),
        }
    }
}

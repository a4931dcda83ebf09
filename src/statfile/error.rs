//! Structured error types for parsing kernel statistics files.
//!
//! [`StatParseError`] describes why a line of a `/proc` or cgroup file could not
//! be turned into a structured value:
//!
//! - [`StatParseError::InvalidKeyValue`]: a known key carried a non-numeric value.
//! - [`StatParseError::InvalidValue`]: a single-value file (e.g. `memory.current`) failed to parse.
//! - [`StatParseError::DuplicateField`]: a key appeared twice where that is disallowed.
//! - [`StatParseError::MalformedLine`]: the line does not have the shape of the format at all.
//! - [`StatParseError::Io`]: the underlying read failed.
//!
//! `StatParseError` converts into [`std::io::Error`] of kind
//! [`std::io::ErrorKind::InvalidData`], so parsers can keep returning
//! `std::io::Result` and callers can still recover the structured cause.
//!
//! # Example
//!
//! ```rust
//! use std::io;
//! use isolation_probe::statfile::StatParseError;
//!
//! fn parse_line(val: &str) -> io::Result<u64> {
//!     let value = val.parse::<u64>().map_err(|e| StatParseError::InvalidValue {
//!         value: val.to_string(),
//!         line: 1,
//!         source: e,
//!     })?;
//!     Ok(value)
//! }
//!
//! parse_line("not-a-number").unwrap_err();
//! ```

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("invalid value for '{key}' at line {line}: '{value}': {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid value at line {line}: '{value}': {source}")]
    InvalidValue {
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("error during I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StatParseError> for std::io::Error {
    fn from(err: StatParseError) -> Self {
        match err {
            StatParseError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

/// Extracts a `StatParseError` from an `std::io::Error` assuming it was wrapped.
///
/// Panics if the inner error is not a `StatParseError`. Intended for use in test assertions only.
#[cfg(test)]
pub(crate) fn extract_stat_parse_error(err: &std::io::Error) -> &StatParseError {
    err.get_ref()
        .and_then(|e| e.downcast_ref::<StatParseError>())
        .unwrap()
}

//! Shared parsing machinery for line-oriented kernel statistics files.
//!
//! Both the `/proc` readers in [`crate::procfs`] and the cgroup stat types in
//! [`crate::cgroup::stats`] build on the traits defined here.
mod error;
mod parser;

pub use error::StatParseError;
pub use parser::{KeyValueStat, SingleLineStat};

#[cfg(test)]
pub(crate) use error::extract_stat_parse_error;
pub(crate) use parser::{parse_decimal, parse_max_or_decimal};

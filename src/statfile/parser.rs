//! Generic traits for parsing line-oriented kernel statistics files into structured types.
//!
//! The same few layouts repeat across `/proc` and the cgroup v2 filesystem:
//!
//! - `key value` lines (`cpu.stat`, `memory.stat`),
//! - `key: value` lines (`/proc/<pid>/io`, `/proc/<pid>/status`),
//! - `device key=value key=value` lines (`io.stat`),
//! - a single scalar (`memory.current`, `pids.max`).
//!
//! [`KeyValueStat`] covers the first three through a handful of associated
//! constants; [`SingleLineStat`] covers the last.
//!
//! # Example: Implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use isolation_probe::statfile::KeyValueStat;
//!
//! #[derive(Default)]
//! struct MyStat {
//!     foo: u64,
//!     bar: u64,
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut MyStat, u64)>> = LazyLock::new(|| {
//!     let mut map: HashMap<&'static str, fn(&mut MyStat, u64)> = HashMap::new();
//!     map.insert("foo", |s, v| s.foo = v);
//!     map.insert("bar", |s, v| s.bar = v);
//!     map
//! });
//!
//! impl KeyValueStat for MyStat {
//!     const SPLIT_CHAR: Option<char> = Some('=');
//!     const SKIP_LINES: usize = 0;
//!     const SKIP_VALUES: usize = 0;
//!     const ALLOW_DUPLICATE_KEYS: bool = false;
//!     const ALLOW_MULTIPLE_KV_PER_LINE: bool = true;
//!
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let stat = MyStat::from_reader(&mut "foo=1 bar=2\n".as_bytes()).unwrap();
//! assert_eq!((stat.foo, stat.bar), (1, 2));
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A trait for parsing structured key-value style files such as `cpu.stat`,
/// `memory.stat`, `io.stat` or `/proc/<pid>/io`.
///
/// Implementors define a set of known keys and how to apply values for them.
/// Unknown keys are ignored unless [`KeyValueStat::on_unknown_key`] is overridden.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// If set to `Some(char)`, each key-value pair is expected to be joined by that character
    /// (`"rbytes=123"` with `Some('=')`).
    ///
    /// If `None`, keys and values are separate whitespace-delimited tokens (`"usage_usec 123"`).
    const SPLIT_CHAR: Option<char>;

    /// The number of lines at the start of the file to skip before parsing begins.
    const SKIP_LINES: usize;

    /// The number of whitespace-separated values to skip at the start of *each line*.
    const SKIP_VALUES: usize;

    /// If `true`, repeated keys are passed to the handler again (e.g. to accumulate).
    /// If `false`, encountering the same key more than once is an error.
    const ALLOW_DUPLICATE_KEYS: bool;

    /// If `true`, the parser consumes every key-value pair on a line.
    /// If `false`, only the first pair of each line is parsed.
    const ALLOW_MULTIPLE_KV_PER_LINE: bool;

    /// Suffix stripped from each key before lookup, e.g. `":"` for `read_bytes: 42`.
    const KEY_SUFFIX: &'static str = "";

    /// Returns the known field names and the functions applying parsed values to `Self`.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses a key-value formatted buffer into `Self`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails, or a [`StatParseError`] wrapped in an
    /// `io::Error` of kind `InvalidData` if a known key carries an invalid value or
    /// repeats when duplicates are disallowed.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let field_count = handlers.len();
        let mut seen_keys = HashSet::with_capacity(field_count);

        let mut line = String::new();
        let mut lineno = 0;
        for _ in 0..Self::SKIP_LINES {
            buf.read_line(&mut line)?;
            line.clear();
        }

        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            Self::parse_line(&mut stat, &line, lineno, handlers, &mut seen_keys)?;
            if !Self::ALLOW_DUPLICATE_KEYS && seen_keys.len() == field_count {
                break;
            }

            line.clear();
        }

        Ok(stat)
    }

    /// Parses a single line into one or more key-value pairs based on the trait configuration.
    fn parse_line(
        stat: &mut Self,
        line: &str,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        let mut parts = line.split_whitespace().skip(Self::SKIP_VALUES);

        if let Some(split_char) = Self::SPLIT_CHAR {
            Self::parse_split_pairs(&mut parts, split_char, stat, lineno, handlers, seen_keys)
        } else {
            Self::parse_flat_pairs(&mut parts, stat, lineno, handlers, seen_keys)
        }
    }

    /// Parses alternating key/value tokens (e.g. `key1 123 key2 456`).
    fn parse_flat_pairs<'a>(
        parts: &mut impl Iterator<Item = &'a str>,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        while let (Some(key), Some(val)) = (parts.next(), parts.next()) {
            Self::parse_and_set(key, val, stat, lineno, handlers, seen_keys)?;
            if !Self::ALLOW_MULTIPLE_KV_PER_LINE {
                break;
            }
        }
        Ok(())
    }

    /// Parses `key<split_char>value` tokens (e.g. `key1=123 key2=456`).
    /// Tokens without the split character are skipped.
    fn parse_split_pairs<'a>(
        parts: &mut impl Iterator<Item = &'a str>,
        split_char: char,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        for part in parts {
            if let Some((key, val)) = part.split_once(split_char) {
                Self::parse_and_set(key, val, stat, lineno, handlers, seen_keys)?;
            }
            if !Self::ALLOW_MULTIPLE_KV_PER_LINE {
                break;
            }
        }
        Ok(())
    }

    /// Parses a single key-value pair and applies it through the field handler.
    ///
    /// # Errors
    ///
    /// [`StatParseError::InvalidKeyValue`] if the value is not a `u64`,
    /// [`StatParseError::DuplicateField`] if the key repeats and duplicates are disallowed.
    fn parse_and_set(
        key: &str,
        val: &str,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        let key = key.strip_suffix(Self::KEY_SUFFIX).unwrap_or(key);
        if let Some((k, handler)) = handlers.get_key_value(key) {
            let parsed = val
                .parse::<u64>()
                .map_err(|source| StatParseError::InvalidKeyValue {
                    key: key.to_string(),
                    value: val.to_string(),
                    line: lineno,
                    source,
                })?;
            if !Self::ALLOW_DUPLICATE_KEYS && !seen_keys.insert(k) {
                return Err(StatParseError::DuplicateField {
                    field: key.to_string(),
                    line: lineno,
                }
                .into());
            }
            handler(stat, parsed);
            return Ok(());
        }

        Self::on_unknown_key(key, val, lineno)
    }

    /// Called when a key is not found in [`KeyValueStat::field_handlers`].
    ///
    /// Unknown keys are silently ignored by default.
    #[inline]
    fn on_unknown_key(_key: &str, _val: &str, _lineno: usize) -> std::io::Result<()> {
        Ok(())
    }
}

/// A trait for parsing single-line, single-value files such as `memory.current`,
/// `memory.max` or `pids.max`.
pub trait SingleLineStat: Sized {
    /// Parses the value from the first line of `buf`.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self>;
}

/// Parses a trimmed decimal value, reporting failures as [`StatParseError::InvalidValue`].
pub(crate) fn parse_decimal(value: &str, line: usize) -> std::io::Result<u64> {
    value.parse::<u64>().map_err(|source| {
        StatParseError::InvalidValue {
            value: value.to_string(),
            line,
            source,
        }
        .into()
    })
}

/// Parses either the literal `max` (returned as `None`) or a decimal value.
///
/// The sentinel is matched before any numeric parse is attempted, so `max`
/// never surfaces as a parse error.
pub(crate) fn parse_max_or_decimal(value: &str, line: usize) -> std::io::Result<Option<u64>> {
    match value {
        "max" => Ok(None),
        value => parse_decimal(value, line).map(Some),
    }
}

use std::fmt;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::Path;

use nix::sys::stat::{major, minor};

/// A block device number as used by `io.max` and `io.stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId {
    pub major: u64,
    pub minor: u64,
}

impl DeviceId {
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    /// Resolves the device behind `path`.
    ///
    /// For a block device node this is the device the node refers to; for any
    /// other path it is the device of the filesystem holding it (`/tmp` on an
    /// ext4 root yields the root partition).
    ///
    /// # Errors
    ///
    /// Returns the error of `stat(2)` on `path`.
    pub fn resolve(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let dev = if metadata.file_type().is_block_device() {
            metadata.rdev()
        } else {
            metadata.dev()
        };

        Ok(Self {
            major: major(dev),
            minor: minor(dev),
        })
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Per-device bandwidth limit written to `io.max`.
///
/// A `None` rate is written as `max`, which lifts a previously set limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoLimit {
    pub device: DeviceId,
    /// Read bytes per second.
    pub rbps: Option<u64>,
    /// Written bytes per second.
    pub wbps: Option<u64>,
}

impl IoLimit {
    pub fn new(device: DeviceId, rbps: Option<u64>, wbps: Option<u64>) -> Self {
        Self { device, rbps, wbps }
    }
}

fn rate(value: Option<u64>) -> String {
    value.map_or_else(|| "max".to_owned(), |v| v.to_string())
}

impl fmt::Display for IoLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rbps={} wbps={}",
            self.device,
            rate(self.rbps),
            rate(self.wbps)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_matches_stat() {
        let dir = tempfile::tempdir().unwrap();
        let dev = std::fs::metadata(dir.path()).unwrap().dev();

        let id = DeviceId::resolve(dir.path()).unwrap();
        assert_eq!(id, DeviceId::new(major(dev), minor(dev)));
    }

    #[test]
    fn test_resolve_missing_path() {
        let err = DeviceId::resolve("/definitely/does/not/exist").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_io_limit_line() {
        let limit = IoLimit::new(DeviceId::new(8, 0), Some(1_048_576), None);
        assert_eq!(limit.to_string(), "8:0 rbps=1048576 wbps=max");
    }
}

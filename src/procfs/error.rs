use std::io;
use std::path::PathBuf;

use nix::errno::Errno;

/// Errors raised while reading the process table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("process {pid} does not exist")]
    ProcessNotFound { pid: u32 },
    #[error("permission denied reading `{path}`")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Classifies an I/O failure on a per-process file.
    ///
    /// `ENOENT` and `ESRCH` both mean the process is gone: the former when the
    /// `/proc/<pid>` directory vanished before `open`, the latter when it exited
    /// between `open` and `read`.
    pub(crate) fn from_pid_io(pid: u32, path: PathBuf, source: io::Error) -> Self {
        match source.raw_os_error().map(Errno::from_raw) {
            Some(Errno::ENOENT | Errno::ESRCH) => Self::ProcessNotFound { pid },
            Some(Errno::EACCES | Errno::EPERM) => Self::PermissionDenied { path, source },
            _ if source.kind() == io::ErrorKind::NotFound => Self::ProcessNotFound { pid },
            _ => Self::Read { path, source },
        }
    }

    /// Classifies an I/O failure on a host-wide file such as `/proc/net/dev`.
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            _ => Self::Read { path, source },
        }
    }

    /// Returns `true` when the error means the addressed process no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProcessNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

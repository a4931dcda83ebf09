use std::io;
use std::path::PathBuf;

use nix::errno::Errno;

use super::NamespaceKind;
use crate::procfs;

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
    #[error("namespace kind `{kind}` cannot be created with unshare(2)")]
    Unsupported { kind: NamespaceKind },
    #[error("failed to fork a measurement child: {0}")]
    Fork(#[source] Errno),
    #[error("failed to wait for the measurement child: {0}")]
    Wait(#[source] Errno),
    #[error("child failed to create a `{kind}` namespace ({status})")]
    Creation { kind: NamespaceKind, status: String },
    #[error("no successful `{kind}` measurement in {attempts} attempts")]
    NoMeasurements { kind: NamespaceKind, attempts: usize },
}

impl From<procfs::Error> for Error {
    fn from(err: procfs::Error) -> Self {
        match err {
            procfs::Error::ProcessNotFound { pid } => Self::ProcessNotFound { pid },
            procfs::Error::PermissionDenied { path, source } => {
                Self::PermissionDenied { path, source }
            }
            procfs::Error::Read { path, source } => Self::Read { path, source },
        }
    }
}

impl Error {
    /// `true` for failures a system-wide scan absorbs: the process vanished or
    /// belongs to someone else.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ProcessNotFound { .. } | Self::PermissionDenied { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use crate::procfs;

/// Errors that end a sampling operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("process {pid} not found")]
    ProcessNotFound { pid: u32 },
    #[error("failed to sample process {pid}: {source}")]
    Sample {
        pid: u32,
        #[source]
        source: procfs::Error,
    },
}

impl Error {
    pub(crate) fn from_procfs(pid: u32, err: procfs::Error) -> Self {
        match err {
            procfs::Error::ProcessNotFound { pid } => Self::ProcessNotFound { pid },
            source => Self::Sample { pid, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

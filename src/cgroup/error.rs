use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;

use super::Controller;
use crate::mountinfo;

/// Errors of cgroup control-plane operations.
///
/// Configuration problems ([`Error::PermissionDenied`], [`Error::ControllerNotEnabled`])
/// are kept apart from plain I/O failures so callers can tell "not set up" from "broken".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid cgroup name `{name}`")]
    InvalidName { name: String },
    #[error("cgroup `{path}` does not exist")]
    GroupNotFound { path: PathBuf },
    #[error("controller `{controller}` is not enabled for `{path}`")]
    ControllerNotEnabled { controller: Controller, path: PathBuf },
    #[error("permission denied for `{path}`")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cgroup `{path}` still has member processes or child groups")]
    Busy { path: PathBuf },
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to resolve the device of `{path}`: {source}")]
    Device {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Mount(#[from] mountinfo::Error),
}

impl Error {
    /// Classifies an OS error raised on `path`, a file inside `group`.
    ///
    /// A missing file is only blamed on the controller when the group itself exists.
    pub(crate) fn classify(
        path: PathBuf,
        source: io::Error,
        group: &Path,
        controller: Option<&Controller>,
    ) -> Self {
        match source.raw_os_error().map(Errno::from_raw) {
            Some(Errno::EACCES | Errno::EPERM) => Self::PermissionDenied { path, source },
            Some(Errno::EBUSY | Errno::ENOTEMPTY) => Self::Busy {
                path: group.to_path_buf(),
            },
            Some(Errno::ENOENT) if !group.is_dir() => Self::GroupNotFound {
                path: group.to_path_buf(),
            },
            Some(Errno::ENOENT) => match controller {
                Some(controller) => Self::ControllerNotEnabled {
                    controller: controller.clone(),
                    path: group.to_path_buf(),
                },
                None => Self::Io { path, source },
            },
            _ => Self::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_errno() {
        let group = tempfile::tempdir().unwrap();
        let file = group.path().join("cpu.max");
        let classify = |errno: Errno, controller: Option<&Controller>| {
            Error::classify(
                file.clone(),
                io::Error::from_raw_os_error(errno as i32),
                group.path(),
                controller,
            )
        };

        assert!(matches!(
            classify(Errno::EACCES, None),
            Error::PermissionDenied { .. }
        ));
        assert!(matches!(
            classify(Errno::EPERM, None),
            Error::PermissionDenied { .. }
        ));
        assert!(matches!(classify(Errno::EBUSY, None), Error::Busy { .. }));
        assert!(matches!(classify(Errno::ENOTEMPTY, None), Error::Busy { .. }));
        assert!(matches!(
            classify(Errno::ENOENT, Some(&Controller::Cpu)),
            Error::ControllerNotEnabled {
                controller: Controller::Cpu,
                ..
            }
        ));
        assert!(matches!(classify(Errno::ENOENT, None), Error::Io { .. }));
        assert!(matches!(classify(Errno::EINVAL, None), Error::Io { .. }));
    }

    #[test]
    fn test_classify_missing_group() {
        let root = tempfile::tempdir().unwrap();
        let group = root.path().join("gone");
        let err = Error::classify(
            group.join("cpu.max"),
            io::Error::from_raw_os_error(Errno::ENOENT as i32),
            &group,
            Some(&Controller::Cpu),
        );
        assert!(matches!(err, Error::GroupNotFound { path } if path == group));
    }
}

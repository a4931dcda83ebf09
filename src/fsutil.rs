use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

/// Error that occurs when opening a file for reading fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Error that occurs when writing to a kernel interface file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to write `{contents}` to `{path}`: {source}")]
pub struct FileWriteError {
    pub path: PathBuf,
    pub contents: String,
    #[source]
    pub source: io::Error,
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use isolation_probe::fsutil;
/// let reader = fsutil::open_file_reader("/proc/self/stat")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Writes `contents` to an already existing file in a single `write(2)`.
///
/// Kernel interface files (`cpu.max`, `cgroup.procs`, ...) are never created by
/// user space, so the file is opened without `O_CREAT`: a missing file surfaces
/// as `NotFound` instead of silently producing a regular file.
///
/// # Errors
///
/// Returns a [`FileWriteError`] carrying the OS error if opening or writing fails.
pub fn write_existing(path: impl AsRef<Path>, contents: &str) -> Result<(), FileWriteError> {
    let path = path.as_ref();
    let wrap = |source| FileWriteError {
        path: path.to_path_buf(),
        contents: contents.to_owned(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path).map_err(wrap)?;
    file.write_all(contents.as_bytes()).map_err(wrap)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_open_file_reader_success() {
        let tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        let reader = open_file_reader(tmp.path()).expect("should open test file");
        let metadata = reader.get_ref().metadata().unwrap();
        assert!(metadata.is_file());
    }

    #[test]
    fn test_open_file_reader_error() {
        let err = open_file_reader("/definitely/does/not/exist").unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/does/not/exist"));
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_write_existing_overwrites_contents() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_existing(tmp.path(), "50000 100000").unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path()).unwrap(), "50000 100000");
    }

    #[test]
    fn test_write_existing_replaces_longer_contents() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_existing(tmp.path(), "max 10000000").unwrap();
        write_existing(tmp.path(), "max 100000").unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path()).unwrap(), "max 100000");
    }

    #[test]
    fn test_write_existing_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.max");

        let err = write_existing(&path, "max").unwrap_err();
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
        assert_eq!(err.contents, "max");
        assert!(!path.exists());
    }
}

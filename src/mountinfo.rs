//! Locates the cgroup v2 hierarchy through `/proc/<pid>/mountinfo`.
//!
//! Each mountinfo line has the shape
//!
//! ```text
//! 36 25 0:32 / /sys/fs/cgroup rw,nosuid shared:9 - cgroup2 cgroup2 rw,nsdelegate
//! ```
//!
//! where a ` - ` separator divides the per-mount fields (with a variable number of
//! optional tags) from the filesystem fields. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html).

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::fsutil;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed line {line} in `{path}`: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: &'static str,
    },
    #[error("no cgroup2 mount listed in `{path}`")]
    MissingCgroup2Mount { path: PathBuf },
    #[error("cgroup2 mount point `{path}` is unusable: {source}")]
    Unusable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cgroup2 mount point `{path}` is not a directory")]
    NotADirectory { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

/// The fields of a mountinfo line this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub major_minor: String,
    /// Root of the mount within its filesystem.
    pub root: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
}

/// Reverses the octal escaping (`\040` for space, ...) the kernel applies to paths.
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes.get(i..i + 4) {
            Some([b'\\', a @ b'0'..=b'3', b @ b'0'..=b'7', c @ b'0'..=b'7']) => {
                out.push((a - b'0') * 64 + (b - b'0') * 8 + (c - b'0'));
                i += 4;
            }
            _ => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parses one mountinfo line, returning a static reason on failure.
pub fn parse_line(line: &str) -> std::result::Result<MountEntry, &'static str> {
    let (mount_fields, fs_fields) = line
        .split_once(" - ")
        .ok_or("missing ` - ` separator")?;

    let mut mount_fields = mount_fields.split_whitespace();
    let _mount_id = mount_fields.next().ok_or("missing mount id")?;
    let _parent_id = mount_fields.next().ok_or("missing parent id")?;
    let major_minor = mount_fields.next().ok_or("missing major:minor")?;
    let root = mount_fields.next().ok_or("missing root")?;
    let mount_point = mount_fields.next().ok_or("missing mount point")?;

    let fs_type = fs_fields
        .split_whitespace()
        .next()
        .ok_or("missing filesystem type")?;

    Ok(MountEntry {
        major_minor: major_minor.to_owned(),
        root: unescape(root),
        mount_point: PathBuf::from(unescape(mount_point)),
        fs_type: fs_type.to_owned(),
    })
}

/// Returns the mount point of the first `cgroup2` entry in the mountinfo file at `path`.
///
/// # Errors
///
/// - [`Error::FileOpen`] or [`Error::Read`] if the file cannot be read.
/// - [`Error::Malformed`] if a line before the match cannot be parsed.
/// - [`Error::MissingCgroup2Mount`] if no `cgroup2` mount is listed.
pub fn find_cgroup2_mount(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let reader = fsutil::open_file_reader(path)?;
    find_cgroup2_mount_from_reader(reader, path)
}

fn find_cgroup2_mount_from_reader<R: BufRead>(mut reader: R, origin: &Path) -> Result<PathBuf> {
    let mut line = String::with_capacity(256);
    let mut lineno = 0;

    loop {
        line.clear();
        let read = reader.read_line(&mut line).map_err(|source| Error::Read {
            path: origin.to_path_buf(),
            source,
        })?;
        if read == 0 {
            return Err(Error::MissingCgroup2Mount {
                path: origin.to_path_buf(),
            });
        }
        lineno += 1;

        let entry = parse_line(line.trim_end()).map_err(|reason| Error::Malformed {
            path: origin.to_path_buf(),
            line: lineno,
            reason,
        })?;
        if entry.fs_type == "cgroup2" {
            log::debug!(
                "Found cgroup2 mount at `{}` (root `{}`)",
                entry.mount_point.display(),
                entry.root
            );
            return Ok(entry.mount_point);
        }
    }
}

/// Like [`find_cgroup2_mount`], but canonicalizes the result and checks that it is a directory.
pub fn find_validated_cgroup2_mount(path: impl AsRef<Path>) -> Result<PathBuf> {
    let raw = find_cgroup2_mount(path)?;
    let canonical = std::fs::canonicalize(&raw).map_err(|source| Error::Unusable {
        path: raw.clone(),
        source,
    })?;

    if !canonical.is_dir() {
        return Err(Error::NotADirectory { path: canonical });
    }
    Ok(canonical)
}

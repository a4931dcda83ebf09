//! Read-only access to the process table exposed under `/proc`.
//!
//! [`ProcFs`] is rooted at a configurable directory so tests (and callers
//! inspecting a host `/proc` mounted elsewhere) can point it at a fabricated
//! tree. Each reader opens the file, parses it with the matching parser and
//! classifies OS failures into [`Error`].
mod error;
mod io;
mod net;
mod stat;
mod statm;
mod status;

pub use error::{Error, Result};
pub use io::ProcIo;
pub use net::{NetDevStat, count_socket_entries};
pub use stat::ProcStat;
pub use statm::ProcStatm;
pub use status::ProcStatus;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::statfile::{KeyValueStat, SingleLineStat};

/// Default mount point of the proc filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Handle on a proc filesystem mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/<pid>`.
    pub fn pid_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }

    /// Returns the directory holding the namespace links of `pid`.
    pub fn ns_dir(&self, pid: u32) -> PathBuf {
        self.pid_dir(pid).join("ns")
    }

    /// Returns the `mountinfo` file of the calling process.
    pub fn self_mountinfo(&self) -> PathBuf {
        self.root.join("self/mountinfo")
    }

    /// Lists the pids currently present in the process table, in ascending order.
    ///
    /// Non-numeric entries (`self`, `sys`, ...) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory itself cannot be listed. Entries
    /// that disappear while iterating are ignored.
    pub fn pids(&self) -> Result<Vec<u32>> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|source| Error::from_io(self.root.clone(), source))?;

        let mut pids: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .collect();
        pids.sort_unstable();

        Ok(pids)
    }

    /// Reads `/proc/<pid>/stat`.
    pub fn read_stat(&self, pid: u32) -> Result<ProcStat> {
        self.read_pid_file(pid, "stat", |r| ProcStat::from_reader(r))
    }

    /// Reads `/proc/<pid>/status`.
    pub fn read_status(&self, pid: u32) -> Result<ProcStatus> {
        self.read_pid_file(pid, "status", |r| ProcStatus::from_reader(r))
    }

    /// Reads `/proc/<pid>/statm`.
    pub fn read_statm(&self, pid: u32) -> Result<ProcStatm> {
        self.read_pid_file(pid, "statm", |r| ProcStatm::from_reader(r))
    }

    /// Reads `/proc/<pid>/io`.
    pub fn read_io(&self, pid: u32) -> Result<ProcIo> {
        self.read_pid_file(pid, "io", |r| ProcIo::from_reader(r))
    }

    /// Reads the command name from `/proc/<pid>/comm` without the trailing newline.
    pub fn read_comm(&self, pid: u32) -> Result<String> {
        let path = self.pid_dir(pid).join("comm");
        std::fs::read_to_string(&path)
            .map(|comm| comm.trim_end_matches('\n').to_owned())
            .map_err(|source| Error::from_pid_io(pid, path, source))
    }

    /// Counts the TCP sockets (IPv4 and IPv6) visible in the network namespace of `pid`.
    ///
    /// A missing `tcp6` table (IPv6 disabled) counts as zero sockets.
    pub fn count_tcp_connections(&self, pid: u32) -> Result<u64> {
        let v4 = self.read_pid_file(pid, "net/tcp", |r| count_socket_entries(r))?;
        let v6 = match self.read_pid_file(pid, "net/tcp6", |r| count_socket_entries(r)) {
            Ok(count) => count,
            Err(Error::ProcessNotFound { .. }) if self.pid_dir(pid).exists() => 0,
            Err(err) => return Err(err),
        };
        Ok(v4 + v6)
    }

    /// Reads host-wide interface totals from `<root>/net/dev`.
    pub fn read_net_dev(&self) -> Result<NetDevStat> {
        let path = self.root.join("net/dev");
        let mut reader = fsutil::open_file_reader(&path)
            .map_err(|err| Error::from_io(err.path, err.source))?;
        NetDevStat::from_reader(&mut reader).map_err(|source| Error::from_io(path, source))
    }

    fn read_pid_file<T>(
        &self,
        pid: u32,
        name: &str,
        parse: impl FnOnce(&mut BufReader<File>) -> std::io::Result<T>,
    ) -> Result<T> {
        let path = self.pid_dir(pid).join(name);
        let mut reader = fsutil::open_file_reader(&path)
            .map_err(|err| Error::from_pid_io(pid, err.path, err.source))?;
        parse(&mut reader).map_err(|source| Error::from_pid_io(pid, path, source))
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn test_pids_skips_non_numeric_entries() {
        let root = tempfile::tempdir().unwrap();
        for name in ["12", "3", "self", "sys", "100"] {
            std::fs::create_dir(root.path().join(name)).unwrap();
        }

        let procfs = ProcFs::new(root.path());
        assert_eq!(procfs.pids().unwrap(), vec![3, 12, 100]);
    }

    #[test]
    fn test_read_process_files() {
        let root = tempfile::tempdir().unwrap();
        write_process(root.path(), 4242, STAT_LINE);
        let procfs = ProcFs::new(root.path());

        let stat = procfs.read_stat(4242).unwrap();
        assert_eq!(stat.comm, "worker");
        assert_eq!((stat.utime, stat.stime), (120, 30));
        assert_eq!(procfs.read_comm(4242).unwrap(), "worker");
        assert_eq!(procfs.read_status(4242).unwrap().vm_swap_kb, 8);
        assert_eq!(procfs.read_statm(4242).unwrap().shared, 64);
        assert_eq!(procfs.read_io(4242).unwrap().write_bytes, 8192);
        assert_eq!(procfs.count_tcp_connections(4242).unwrap(), 1);
    }

    #[test]
    fn test_missing_process_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let procfs = ProcFs::new(root.path());

        let err = procfs.read_stat(999).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, Error::ProcessNotFound { pid: 999 }));
    }

    #[test]
    fn test_malformed_file_is_read_error() {
        let root = tempfile::tempdir().unwrap();
        write_process(root.path(), 7, "garbage\n");
        let procfs = ProcFs::new(root.path());

        match procfs.read_stat(7).unwrap_err() {
            Error::Read { path, source } => {
                assert_eq!(path, root.path().join("7/stat"));
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_net_dev() {
        let root = tempfile::tempdir().unwrap();
        write_net_dev(root.path(), 1000, 2000);

        let net = ProcFs::new(root.path()).read_net_dev().unwrap();
        assert_eq!((net.rx_bytes, net.tx_bytes), (1000, 2000));
        assert_eq!((net.rx_packets, net.tx_packets), (10, 20));
    }
}

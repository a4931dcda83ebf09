use std::os::unix::fs::MetadataExt;
use std::path::Path;

use serde::Serialize;

use super::report::ReportBuilder;
use super::{Error, NamespaceComparison, NamespaceKind, NamespaceMembership, Result, SystemReport};
use crate::procfs::{self, ProcFs};

/// A process found inside a given namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceMember {
    pub pid: u32,
    pub kind: NamespaceKind,
}

/// Queries namespace memberships from the process table.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    procfs: ProcFs,
}

impl NamespaceRegistry {
    pub fn new(procfs: ProcFs) -> Self {
        Self { procfs }
    }

    /// Lists the namespaces of `pid`, sorted by kind.
    ///
    /// # Errors
    ///
    /// - [`Error::ProcessNotFound`] if `pid` does not exist (or exited while reading).
    /// - [`Error::PermissionDenied`] if the links of `pid` may not be inspected.
    pub fn list_for_process(&self, pid: u32) -> Result<Vec<NamespaceMembership>> {
        let dir = self.procfs.ns_dir(pid);
        let entries = std::fs::read_dir(&dir)
            .map_err(|source| procfs::Error::from_pid_io(pid, dir.clone(), source))?;

        let mut memberships = Vec::with_capacity(10);
        for entry in entries {
            let entry = entry.map_err(|source| procfs::Error::from_pid_io(pid, dir.clone(), source))?;
            if !entry.file_type().is_ok_and(|ft| ft.is_symlink()) {
                continue;
            }

            let path = entry.path();
            let membership = NamespaceMembership::read_link(&path)
                .map_err(|source| procfs::Error::from_pid_io(pid, path, source))?;
            memberships.push(membership);
        }

        memberships.sort_by(|a, b| a.kind.cmp(&b.kind));
        Ok(memberships)
    }

    /// Compares the namespaces of `first` and `second`.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::list_for_process`] for either pid.
    pub fn compare(&self, first: u32, second: u32) -> Result<NamespaceComparison> {
        let ours = self.list_for_process(first)?;
        let theirs = self.list_for_process(second)?;
        Ok(NamespaceComparison::between(first, &ours, second, &theirs))
    }

    /// Groups every process on the host into namespace equivalence classes.
    ///
    /// Processes that vanish or cannot be inspected during the scan are
    /// skipped; classes recorded before are kept.
    ///
    /// # Errors
    ///
    /// Only fails if the process table itself cannot be listed.
    pub fn build_system_report(&self) -> Result<SystemReport> {
        let pids = self.procfs.pids()?;
        let mut builder = ReportBuilder::default();

        for pid in pids {
            builder.saw_process();
            match self.list_for_process(pid) {
                Ok(memberships) => builder.add_process(pid, &memberships),
                Err(err) if err.is_transient() => log::debug!("Skipping pid {pid}: {err}"),
                Err(err) => log::warn!("Skipping pid {pid}: {err}"),
            }
        }

        let report = builder.finish();
        log::debug!(
            "Namespace scan: {} processes seen, {} analyzed, {} classes",
            report.processes_seen,
            report.processes_analyzed,
            report.classes.len()
        );
        Ok(report)
    }

    /// Finds the processes whose namespaces include the one at `ns_path`
    /// (e.g. `/proc/1/ns/net` or a bind mount under `/run/netns`).
    ///
    /// Matching is by inode, so any path to the same namespace works.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if `ns_path` cannot be resolved, and fails if
    /// the process table cannot be listed.
    pub fn find_processes_in(&self, ns_path: impl AsRef<Path>) -> Result<Vec<NamespaceMember>> {
        let ns_path = ns_path.as_ref();
        let inode = std::fs::metadata(ns_path)
            .map_err(|source| Error::Read {
                path: ns_path.to_path_buf(),
                source,
            })?
            .ino();

        let mut members = Vec::new();
        for pid in self.procfs.pids()? {
            let memberships = match self.list_for_process(pid) {
                Ok(memberships) => memberships,
                Err(err) => {
                    log::debug!("Skipping pid {pid}: {err}");
                    continue;
                }
            };
            if let Some(found) = memberships.into_iter().find(|m| m.inode == inode) {
                members.push(NamespaceMember {
                    pid,
                    kind: found.kind,
                });
            }
        }
        Ok(members)
    }
}

//! Structured records for the stat and limit files of a cgroup v2 group.
//!
//! Each interface file has its own parser built on [`crate::statfile`].
//! [`CgroupStat`] tags the per-controller records so callers that fetch stats
//! generically (see [`crate::cgroup::CgroupController::read_stat`]) can match on
//! the variant.

mod cpu;
mod io;
mod memory;
mod pids;

pub use cpu::{CpuLimit, CpuStat, DEFAULT_PERIOD};
pub use io::IoStat;
pub use memory::{MemoryBreakdown, MemoryLimit, MemoryStat, MemoryUsage};
pub use pids::{PidsCurrent, PidsLimit, PidsStat};

use super::Controller;

/// Selects which record [`CgroupStat`] should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Cpu,
    Memory,
    Io,
    Pids,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [StatKind::Cpu, StatKind::Memory, StatKind::Io, StatKind::Pids];

    /// The controller that provides this record's files.
    pub fn controller(self) -> Controller {
        match self {
            StatKind::Cpu => Controller::Cpu,
            StatKind::Memory => Controller::Memory,
            StatKind::Io => Controller::Io,
            StatKind::Pids => Controller::Pids,
        }
    }
}

/// A parsed stat record of one controller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CgroupStat {
    Cpu(CpuStat),
    Memory(MemoryStat),
    Io(IoStat),
    Pids(PidsStat),
}

impl CgroupStat {
    pub fn kind(&self) -> StatKind {
        match self {
            CgroupStat::Cpu(_) => StatKind::Cpu,
            CgroupStat::Memory(_) => StatKind::Memory,
            CgroupStat::Io(_) => StatKind::Io,
            CgroupStat::Pids(_) => StatKind::Pids,
        }
    }
}

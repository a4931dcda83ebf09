use std::fmt;

use nix::sched::CloneFlags;
use serde::{Serialize, Serializer};

/// A namespace type, named after its link in `/proc/<pid>/ns`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamespaceKind {
    Cgroup,
    Ipc,
    Mnt,
    Net,
    Pid,
    PidForChildren,
    Time,
    TimeForChildren,
    User,
    Uts,
    /// A link this crate has no dedicated variant for.
    Other(String),
}

impl NamespaceKind {
    pub fn name(&self) -> &str {
        match self {
            NamespaceKind::Cgroup => "cgroup",
            NamespaceKind::Ipc => "ipc",
            NamespaceKind::Mnt => "mnt",
            NamespaceKind::Net => "net",
            NamespaceKind::Pid => "pid",
            NamespaceKind::PidForChildren => "pid_for_children",
            NamespaceKind::Time => "time",
            NamespaceKind::TimeForChildren => "time_for_children",
            NamespaceKind::User => "user",
            NamespaceKind::Uts => "uts",
            NamespaceKind::Other(name) => name,
        }
    }

    /// The `unshare(2)` flag that creates a namespace of this kind.
    ///
    /// `None` for the `*_for_children` views, `time` and unknown kinds.
    pub fn clone_flag(&self) -> Option<CloneFlags> {
        match self {
            NamespaceKind::Cgroup => Some(CloneFlags::CLONE_NEWCGROUP),
            NamespaceKind::Ipc => Some(CloneFlags::CLONE_NEWIPC),
            NamespaceKind::Mnt => Some(CloneFlags::CLONE_NEWNS),
            NamespaceKind::Net => Some(CloneFlags::CLONE_NEWNET),
            NamespaceKind::Pid => Some(CloneFlags::CLONE_NEWPID),
            NamespaceKind::User => Some(CloneFlags::CLONE_NEWUSER),
            NamespaceKind::Uts => Some(CloneFlags::CLONE_NEWUTS),
            _ => None,
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for NamespaceKind {
    fn from(s: &str) -> Self {
        match s {
            "cgroup" => NamespaceKind::Cgroup,
            "ipc" => NamespaceKind::Ipc,
            "mnt" => NamespaceKind::Mnt,
            "net" => NamespaceKind::Net,
            "pid" => NamespaceKind::Pid,
            "pid_for_children" => NamespaceKind::PidForChildren,
            "time" => NamespaceKind::Time,
            "time_for_children" => NamespaceKind::TimeForChildren,
            "user" => NamespaceKind::User,
            "uts" => NamespaceKind::Uts,
            other => NamespaceKind::Other(other.to_owned()),
        }
    }
}

impl Serialize for NamespaceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

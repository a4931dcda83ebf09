use std::fmt;
use std::str::FromStr;

/// A cgroup v2 resource controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Controller {
    Cpu,
    Cpuset,
    Io,
    Memory,
    Pids,
    Hugetlb,
    Rdma,
    Misc,
    /// A controller this crate has no dedicated variant for.
    Other(String),
}

impl Controller {
    pub fn name(&self) -> &str {
        match self {
            Controller::Cpu => "cpu",
            Controller::Cpuset => "cpuset",
            Controller::Io => "io",
            Controller::Memory => "memory",
            Controller::Pids => "pids",
            Controller::Hugetlb => "hugetlb",
            Controller::Rdma => "rdma",
            Controller::Misc => "misc",
            Controller::Other(name) => name,
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Controller {
    fn from(s: &str) -> Self {
        match s {
            "cpu" => Controller::Cpu,
            "cpuset" => Controller::Cpuset,
            "io" => Controller::Io,
            "memory" => Controller::Memory,
            "pids" => Controller::Pids,
            "hugetlb" => Controller::Hugetlb,
            "rdma" => Controller::Rdma,
            "misc" => Controller::Misc,
            other => Controller::Other(other.to_owned()),
        }
    }
}

impl FromStr for Controller {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Controller::from(s))
    }
}

/// Parses the space-separated contents of `cgroup.controllers` or
/// `cgroup.subtree_control`.
pub(crate) fn parse_controller_list(contents: &str) -> Vec<Controller> {
    contents
        .split_whitespace()
        .map(Controller::from)
        .collect()
}

/// Formats the `+name +name` line that enables controllers in `cgroup.subtree_control`.
pub(crate) fn enable_line(controllers: &[Controller]) -> String {
    controllers
        .iter()
        .map(|c| format!("+{c}"))
        .collect::<Vec<_>>()
        .join(" ")
}

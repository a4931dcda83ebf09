//! Resource isolation through the cgroup v2 unified hierarchy.
//!
//! [`CgroupController`] creates and removes groups, writes limits to their
//! interface files, moves processes between groups and reads the per-controller
//! stat records back.
//!
//! # Interface files
//!
//! | Controller | Written            | Read                                                    |
//! |------------|--------------------|---------------------------------------------------------|
//! | `cpu`      | `cpu.max`          | `cpu.stat`, `cpu.max`                                   |
//! | `memory`   | `memory.max`       | `memory.current`, `memory.max`, `memory.peak`, `memory.stat` |
//! | `io`       | `io.max`           | `io.stat`                                               |
//! | `pids`     | `pids.max`         | `pids.current`, `pids.max`                              |
//! | (core)     | `cgroup.procs`, `cgroup.subtree_control` | `cgroup.procs`, `cgroup.controllers` |
//!
//! # Platform Requirements
//!
//! - Linux with a mounted cgroup2 filesystem (see [`crate::mountinfo`]).
//! - Write access to the hierarchy for anything but reads, usually root.
mod controller;
mod controllers;
mod device;
mod error;
pub mod stats;

pub use controller::{CgroupController, CgroupReport, DEFAULT_CGROUP_ROOT};
pub use controllers::Controller;
pub use device::{DeviceId, IoLimit};
pub use error::{Error, Result};

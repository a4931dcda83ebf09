//! Discovery of kernel namespace sharing between processes.
//!
//! Every process exposes one link per namespace kind under `/proc/<pid>/ns`,
//! resolving to `kind:[inode]`. The inode is the identity of the namespace:
//! two processes share a namespace iff kind and inode match.
//!
//! - [`NamespaceRegistry::list_for_process`] lists the memberships of one pid.
//! - [`NamespaceRegistry::compare`] pairs two processes kind by kind.
//! - [`NamespaceRegistry::build_system_report`] groups the whole process table
//!   into [`NamespaceEquivalenceClass`]es.
//! - [`measure_creation_overhead`] times `unshare(2)` in a forked child.
mod compare;
mod error;
mod kind;
mod membership;
mod overhead;
mod registry;
mod report;

pub use compare::{ComparisonEntry, IsolationLevel, NamespaceComparison, Sharing};
pub use error::{Error, Result};
pub use kind::NamespaceKind;
pub use membership::{NamespaceMembership, parse_target};
pub use overhead::{OverheadSummary, measure_creation_overhead, measure_creation_overhead_repeated};
pub use registry::{NamespaceMember, NamespaceRegistry};
pub use report::{NamespaceEquivalenceClass, SystemReport};

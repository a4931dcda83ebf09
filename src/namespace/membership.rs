use std::os::unix::fs::MetadataExt;
use std::path::Path;

use serde::Serialize;

use super::NamespaceKind;

/// One namespace a process belongs to.
///
/// Two memberships name the same namespace iff kind and inode match; the
/// link targets may still differ in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceMembership {
    pub kind: NamespaceKind,
    pub inode: u64,
    /// The link target, e.g. `net:[4026531840]`.
    pub target: String,
}

impl NamespaceMembership {
    /// Reads the namespace link at `path`, e.g. `/proc/1/ns/net`.
    ///
    /// The inode is taken from the `type:[inode]` target; if the target has
    /// another shape, the link is followed and the inode of its target used.
    pub fn read_link(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = std::fs::read_link(path)?.to_string_lossy().into_owned();

        let inode = match parse_target(&target) {
            Some((_, inode)) => inode,
            None => std::fs::metadata(path)?.ino(),
        };

        Ok(Self {
            kind: NamespaceKind::from(name.as_str()),
            inode,
            target,
        })
    }

    pub fn same_namespace(&self, other: &NamespaceMembership) -> bool {
        self.kind == other.kind && self.inode == other.inode
    }
}

/// Splits a `type:[inode]` link target.
pub fn parse_target(target: &str) -> Option<(&str, u64)> {
    let (kind, rest) = target.split_once(':')?;
    let inode = rest.strip_prefix('[')?.strip_suffix(']')?;
    Some((kind, inode.parse().ok()?))
}

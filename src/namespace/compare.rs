use serde::Serialize;

use super::{NamespaceKind, NamespaceMembership};

/// How one namespace kind relates between two processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Sharing {
    Shared,
    Different { other_inode: u64 },
    /// The second process exposes no link of this kind.
    UniqueToFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEntry {
    pub kind: NamespaceKind,
    /// Inode on the first process.
    pub inode: u64,
    pub sharing: Sharing,
}

/// Qualitative isolation derived from the number of differing namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationLevel {
    None,
    Low,
    Medium,
    High,
}

impl IsolationLevel {
    const LOW_BELOW: usize = 3;
    const MEDIUM_BELOW: usize = 6;

    pub fn from_differences(different: usize) -> Self {
        match different {
            0 => IsolationLevel::None,
            n if n < Self::LOW_BELOW => IsolationLevel::Low,
            n if n < Self::MEDIUM_BELOW => IsolationLevel::Medium,
            _ => IsolationLevel::High,
        }
    }
}

/// Per-kind comparison of the namespaces of two processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceComparison {
    pub first: u32,
    pub second: u32,
    pub entries: Vec<ComparisonEntry>,
    pub shared: usize,
    pub different: usize,
    /// Number of namespace kinds of the first process.
    pub compared: usize,
    pub isolation: IsolationLevel,
}

impl NamespaceComparison {
    /// Pairs the memberships of `first` with those of `second` by kind.
    pub fn between(
        first: u32,
        first_memberships: &[NamespaceMembership],
        second: u32,
        second_memberships: &[NamespaceMembership],
    ) -> Self {
        let entries: Vec<ComparisonEntry> = first_memberships
            .iter()
            .map(|ours| {
                let sharing = match second_memberships.iter().find(|t| t.kind == ours.kind) {
                    Some(theirs) if theirs.inode == ours.inode => Sharing::Shared,
                    Some(theirs) => Sharing::Different {
                        other_inode: theirs.inode,
                    },
                    None => Sharing::UniqueToFirst,
                };
                ComparisonEntry {
                    kind: ours.kind.clone(),
                    inode: ours.inode,
                    sharing,
                }
            })
            .collect();

        let shared = entries
            .iter()
            .filter(|e| e.sharing == Sharing::Shared)
            .count();
        let different = entries
            .iter()
            .filter(|e| matches!(e.sharing, Sharing::Different { .. }))
            .count();

        Self {
            first,
            second,
            compared: entries.len(),
            isolation: IsolationLevel::from_differences(different),
            entries,
            shared,
            different,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(kind: NamespaceKind, inode: u64) -> NamespaceMembership {
        NamespaceMembership {
            target: format!("{kind}:[{inode}]"),
            kind,
            inode,
        }
    }

    #[test]
    fn test_isolation_thresholds() {
        assert_eq!(IsolationLevel::from_differences(0), IsolationLevel::None);
        assert_eq!(IsolationLevel::from_differences(1), IsolationLevel::Low);
        assert_eq!(IsolationLevel::from_differences(2), IsolationLevel::Low);
        assert_eq!(IsolationLevel::from_differences(3), IsolationLevel::Medium);
        assert_eq!(IsolationLevel::from_differences(5), IsolationLevel::Medium);
        assert_eq!(IsolationLevel::from_differences(6), IsolationLevel::High);
        assert_eq!(IsolationLevel::from_differences(10), IsolationLevel::High);
    }

    #[test]
    fn test_self_comparison() {
        let memberships = vec![
            ns(NamespaceKind::Net, 1),
            ns(NamespaceKind::Pid, 2),
            ns(NamespaceKind::Mnt, 3),
        ];
        let cmp = NamespaceComparison::between(10, &memberships, 10, &memberships);
        assert_eq!(cmp.different, 0);
        assert_eq!(cmp.shared, 3);
        assert_eq!(cmp.isolation, IsolationLevel::None);
    }

    #[test]
    fn test_mixed_comparison() {
        let first = vec![
            ns(NamespaceKind::Net, 1),
            ns(NamespaceKind::Pid, 2),
            ns(NamespaceKind::Time, 3),
        ];
        let second = vec![ns(NamespaceKind::Pid, 2), ns(NamespaceKind::Net, 9)];

        let cmp = NamespaceComparison::between(1, &first, 2, &second);
        assert_eq!(
            cmp.entries.iter().map(|e| e.sharing).collect::<Vec<_>>(),
            vec![
                Sharing::Different { other_inode: 9 },
                Sharing::Shared,
                Sharing::UniqueToFirst,
            ]
        );
        assert_eq!((cmp.shared, cmp.different, cmp.compared), (1, 1, 3));
        assert_eq!(cmp.isolation, IsolationLevel::Low);
    }

    #[test]
    fn test_path_text_does_not_matter() {
        let first = vec![ns(NamespaceKind::Uts, 5)];
        let mut second = first.clone();
        second[0].target = "/run/netns/elsewhere".to_owned();

        let cmp = NamespaceComparison::between(1, &first, 2, &second);
        assert_eq!(cmp.entries[0].sharing, Sharing::Shared);
    }
}

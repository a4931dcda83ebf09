use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::{NamespaceKind, NamespaceMembership};

/// All scanned processes that share one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceEquivalenceClass {
    pub kind: NamespaceKind,
    pub inode: u64,
    /// Link target of the first process seen in the class.
    pub path: String,
    pub pids: BTreeSet<u32>,
}

/// Result of one scan over the whole process table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemReport {
    /// Sorted by kind, then inode.
    pub classes: Vec<NamespaceEquivalenceClass>,
    pub processes_seen: usize,
    /// Processes whose namespaces could be read.
    pub processes_analyzed: usize,
}

impl SystemReport {
    /// The class of kind `kind` that `pid` belongs to.
    pub fn class_of(&self, kind: &NamespaceKind, pid: u32) -> Option<&NamespaceEquivalenceClass> {
        self.classes
            .iter()
            .find(|class| &class.kind == kind && class.pids.contains(&pid))
    }

    pub fn classes_of_kind<'a>(
        &'a self,
        kind: &'a NamespaceKind,
    ) -> impl Iterator<Item = &'a NamespaceEquivalenceClass> + 'a {
        self.classes.iter().filter(move |class| &class.kind == kind)
    }
}

/// Accumulates memberships into classes keyed by `(kind, inode)`.
#[derive(Debug, Default)]
pub(crate) struct ReportBuilder {
    classes: HashMap<(NamespaceKind, u64), NamespaceEquivalenceClass>,
    processes_seen: usize,
    processes_analyzed: usize,
}

impl ReportBuilder {
    pub(crate) fn saw_process(&mut self) {
        self.processes_seen += 1;
    }

    pub(crate) fn add_process(&mut self, pid: u32, memberships: &[NamespaceMembership]) {
        if memberships.is_empty() {
            return;
        }
        self.processes_analyzed += 1;

        for membership in memberships {
            self.classes
                .entry((membership.kind.clone(), membership.inode))
                .or_insert_with(|| NamespaceEquivalenceClass {
                    kind: membership.kind.clone(),
                    inode: membership.inode,
                    path: membership.target.clone(),
                    pids: BTreeSet::new(),
                })
                .pids
                .insert(pid);
        }
    }

    pub(crate) fn finish(self) -> SystemReport {
        let mut classes: Vec<_> = self.classes.into_values().collect();
        classes.sort_by(|a, b| (&a.kind, a.inode).cmp(&(&b.kind, b.inode)));

        SystemReport {
            classes,
            processes_seen: self.processes_seen,
            processes_analyzed: self.processes_analyzed,
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
    fn test_groups_by_kind_and_inode() {
        let mut builder = ReportBuilder::default();
        for _ in 0..4 {
            builder.saw_process();
        }
        builder.add_process(1, &[ns(NamespaceKind::Pid, 100), ns(NamespaceKind::Net, 200)]);
        builder.add_process(2, &[ns(NamespaceKind::Pid, 100), ns(NamespaceKind::Net, 201)]);
        // Same inode under another kind stays a separate class.
        builder.add_process(3, &[ns(NamespaceKind::PidForChildren, 100)]);
        builder.add_process(4, &[]);

        let report = builder.finish();
        assert_eq!(report.processes_seen, 4);
        assert_eq!(report.processes_analyzed, 3);
        assert_eq!(report.classes.len(), 4);

        let pid_class = report.class_of(&NamespaceKind::Pid, 1).unwrap();
        assert_eq!(pid_class.pids, BTreeSet::from([1, 2]));
        assert_eq!(pid_class.path, "pid:[100]");
        assert_eq!(report.classes_of_kind(&NamespaceKind::Net).count(), 2);
        assert!(report.class_of(&NamespaceKind::Pid, 3).is_none());
    }

    #[test]
    fn test_classes_are_sorted() {
        let mut builder = ReportBuilder::default();
        builder.add_process(1, &[ns(NamespaceKind::Uts, 5), ns(NamespaceKind::Net, 9)]);
        builder.add_process(2, &[ns(NamespaceKind::Net, 3)]);

        let keys: Vec<_> = builder
            .finish()
            .classes
            .into_iter()
            .map(|c| (c.kind, c.inode))
            .collect();
        assert_eq!(
            keys,
            vec![
                (NamespaceKind::Net, 3),
                (NamespaceKind::Net, 9),
                (NamespaceKind::Uts, 5),
            ]
        );
    }
}

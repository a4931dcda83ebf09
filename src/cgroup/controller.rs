use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::controllers::{enable_line, parse_controller_list};
use super::device::{DeviceId, IoLimit};
use super::stats::{
    CgroupStat, CpuLimit, CpuStat, IoStat, MemoryBreakdown, MemoryLimit, MemoryStat, MemoryUsage,
    PidsCurrent, PidsLimit, PidsStat, StatKind,
};
use super::{Controller, Error, Result};
use crate::fsutil;
use crate::mountinfo;
use crate::statfile::{KeyValueStat, SingleLineStat, StatParseError};

/// Mount point of the unified hierarchy on systemd-based distributions.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Everything readable about one group at a point in time.
///
/// Stats of controllers that are not enabled for the group are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgroupReport {
    pub name: String,
    pub path: PathBuf,
    pub cpu_limit: Option<CpuLimit>,
    pub memory_limit: Option<MemoryLimit>,
    pub stats: Vec<CgroupStat>,
    pub processes: Vec<u32>,
}

/// Creates, configures and inspects groups below a cgroup v2 mount.
///
/// Groups are addressed by their path relative to the root (`"bench/g1"`);
/// the empty name (or `"/"`) is the root group itself. All operations are
/// synchronous file operations on the kernel's interface files. Concurrent
/// writers to the same group are not coordinated: the last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupController {
    root: PathBuf,
}

impl Default for CgroupController {
    fn default() -> Self {
        Self::new(DEFAULT_CGROUP_ROOT)
    }
}

impl CgroupController {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locates the cgroup2 mount listed in `mountinfo` (e.g. `/proc/self/mountinfo`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mount`] if no usable cgroup2 mount is listed.
    pub fn detect(mountinfo: impl AsRef<Path>) -> Result<Self> {
        let root = mountinfo::find_validated_cgroup2_mount(mountinfo)?;
        log::debug!("Using cgroup2 hierarchy at `{}`", root.display());
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `name` below the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name contains `.`, `..` or empty
    /// components, which could escape the hierarchy.
    pub fn group_path(&self, name: &str) -> Result<PathBuf> {
        let relative = name.trim_matches('/');
        if relative.is_empty() {
            return Ok(self.root.clone());
        }
        if relative
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(Error::InvalidName {
                name: name.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Creates the group `name`. An already existing group counts as success.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] for the root group or an escaping name.
    /// - [`Error::GroupNotFound`] if the parent group does not exist.
    /// - [`Error::PermissionDenied`] without write access to the parent.
    pub fn create(&self, name: &str) -> Result<PathBuf> {
        let path = self.group_path(name)?;
        let parent = self.parent_of(name, &path)?;

        match std::fs::create_dir(&path) {
            Ok(()) => log::info!("Created cgroup `{}`", path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                log::debug!("Cgroup `{}` already exists", path.display())
            }
            Err(source) => return Err(Error::classify(path, source, &parent, None)),
        }
        Ok(path)
    }

    /// Removes the group `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] if the group still has member processes or child groups;
    ///   nothing is moved or retried.
    /// - [`Error::GroupNotFound`] if the group does not exist.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.group_path(name)?;
        self.parent_of(name, &path)?;

        std::fs::remove_dir(&path).map_err(|source| Error::classify(path.clone(), source, &path, None))?;
        log::info!("Removed cgroup `{}`", path.display());
        Ok(())
    }

    /// Writes `limit` to `cpu.max`.
    pub fn set_cpu_limit(&self, name: &str, limit: CpuLimit) -> Result<()> {
        self.write_control(name, "cpu.max", Some(&Controller::Cpu), &limit.to_string())
    }

    /// Writes `limit` to `memory.max`.
    pub fn set_memory_limit(&self, name: &str, limit: MemoryLimit) -> Result<()> {
        self.write_control(name, "memory.max", Some(&Controller::Memory), &limit.to_string())
    }

    /// Writes `limit` to `pids.max`.
    pub fn set_pids_max(&self, name: &str, limit: PidsLimit) -> Result<()> {
        self.write_control(name, "pids.max", Some(&Controller::Pids), &limit.to_string())
    }

    /// Writes a per-device bandwidth line to `io.max`.
    pub fn set_io_limit(&self, name: &str, limit: &IoLimit) -> Result<()> {
        self.write_control(name, "io.max", Some(&Controller::Io), &limit.to_string())
    }

    /// Limits I/O bandwidth on the device backing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device of `path` cannot be resolved, in
    /// which case nothing is written.
    pub fn set_io_limit_for_path(
        &self,
        name: &str,
        path: impl AsRef<Path>,
        rbps: Option<u64>,
        wbps: Option<u64>,
    ) -> Result<IoLimit> {
        let path = path.as_ref();
        let device = DeviceId::resolve(path).map_err(|source| Error::Device {
            path: path.to_path_buf(),
            source,
        })?;

        let limit = IoLimit::new(device, rbps, wbps);
        self.set_io_limit(name, &limit)?;
        Ok(limit)
    }

    /// Moves `pid` into the group `name`.
    pub fn add_process(&self, name: &str, pid: u32) -> Result<()> {
        self.write_control(name, "cgroup.procs", None, &pid.to_string())
    }

    /// Moves `pid` back into the root group.
    pub fn move_to_root(&self, pid: u32) -> Result<()> {
        self.add_process("", pid)
    }

    /// Enables `controllers` for the children of `name` through `cgroup.subtree_control`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControllerNotEnabled`] for the first controller that is
    /// not available to `name` itself.
    pub fn enable_controllers(&self, name: &str, controllers: &[Controller]) -> Result<()> {
        let group = self.existing_group(name)?;
        let available = self.available_controllers(name)?;
        if let Some(missing) = controllers.iter().find(|c| !available.contains(*c)) {
            return Err(Error::ControllerNotEnabled {
                controller: missing.clone(),
                path: group,
            });
        }

        self.write_control(name, "cgroup.subtree_control", None, &enable_line(controllers))
    }

    /// Controllers available to `name` (`cgroup.controllers`).
    pub fn available_controllers(&self, name: &str) -> Result<Vec<Controller>> {
        let group = self.existing_group(name)?;
        self.read_controller_list(&group, "cgroup.controllers")
    }

    /// Controllers enabled for the children of `name` (`cgroup.subtree_control`).
    pub fn enabled_controllers(&self, name: &str) -> Result<Vec<Controller>> {
        let group = self.existing_group(name)?;
        self.read_controller_list(&group, "cgroup.subtree_control")
    }

    pub fn read_cpu_stat(&self, name: &str) -> Result<CpuStat> {
        let group = self.existing_group(name)?;
        self.read_file(&group, "cpu.stat", Some(&Controller::Cpu), |r| CpuStat::from_reader(r))
    }

    pub fn read_cpu_limit(&self, name: &str) -> Result<CpuLimit> {
        let group = self.existing_group(name)?;
        self.read_file(&group, "cpu.max", Some(&Controller::Cpu), |r| CpuLimit::from_reader(r))
    }

    pub fn read_memory_limit(&self, name: &str) -> Result<MemoryLimit> {
        let group = self.existing_group(name)?;
        self.read_file(&group, "memory.max", Some(&Controller::Memory), |r| {
            MemoryLimit::from_reader(r)
        })
    }

    /// Reads `memory.current`, `memory.max`, `memory.peak` and `memory.stat`.
    ///
    /// `memory.peak` is optional; its absence yields `peak == 0`.
    pub fn read_memory_stat(&self, name: &str) -> Result<MemoryStat> {
        let group = self.existing_group(name)?;
        let memory = Some(&Controller::Memory);

        let usage = self.read_file(&group, "memory.current", memory, |r| {
            MemoryUsage::from_reader(r)
        })?;
        let limit = self.read_file(&group, "memory.max", memory, |r| MemoryLimit::from_reader(r))?;
        let peak = optional(
            self.read_file(&group, "memory.peak", memory, |r| MemoryUsage::from_reader(r)),
        )?;
        let breakdown = self.read_file(&group, "memory.stat", memory, |r| {
            MemoryBreakdown::from_reader(r)
        })?;

        Ok(MemoryStat::derive(&usage, &limit, peak.as_ref(), &breakdown))
    }

    /// Reads `io.stat`, summed across all devices.
    pub fn read_io_stat(&self, name: &str) -> Result<IoStat> {
        let group = self.existing_group(name)?;
        self.read_file(&group, "io.stat", Some(&Controller::Io), |r| IoStat::from_reader(r))
    }

    pub fn read_pids_stat(&self, name: &str) -> Result<PidsStat> {
        let group = self.existing_group(name)?;
        let pids = Some(&Controller::Pids);

        let current = self.read_file(&group, "pids.current", pids, |r| PidsCurrent::from_reader(r))?;
        let limit = self.read_file(&group, "pids.max", pids, |r| PidsLimit::from_reader(r))?;
        Ok(PidsStat::derive(current, limit))
    }

    /// Reads the record of one controller as a tagged [`CgroupStat`].
    pub fn read_stat(&self, name: &str, kind: StatKind) -> Result<CgroupStat> {
        Ok(match kind {
            StatKind::Cpu => CgroupStat::Cpu(self.read_cpu_stat(name)?),
            StatKind::Memory => CgroupStat::Memory(self.read_memory_stat(name)?),
            StatKind::Io => CgroupStat::Io(self.read_io_stat(name)?),
            StatKind::Pids => CgroupStat::Pids(self.read_pids_stat(name)?),
        })
    }

    /// Member pids of `name`, in the order the kernel lists them.
    pub fn list_processes(&self, name: &str) -> Result<Vec<u32>> {
        let group = self.existing_group(name)?;
        self.read_file(&group, "cgroup.procs", None, |reader| {
            let mut pids = Vec::new();
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let pid = line.parse::<u32>().map_err(|source| StatParseError::InvalidValue {
                    value: line.to_owned(),
                    line: index + 1,
                    source,
                })?;
                pids.push(pid);
            }
            Ok(pids)
        })
    }

    /// Names of the direct child groups of `name`, sorted.
    pub fn list_groups(&self, name: &str) -> Result<Vec<String>> {
        let group = self.existing_group(name)?;
        let entries = std::fs::read_dir(&group)
            .map_err(|source| Error::classify(group.clone(), source, &group, None))?;

        let mut children: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        children.sort();
        Ok(children)
    }

    /// Collects limits, every available stat record and the member pids of `name`.
    pub fn report(&self, name: &str) -> Result<CgroupReport> {
        let path = self.existing_group(name)?;

        let mut stats = Vec::with_capacity(StatKind::ALL.len());
        for kind in StatKind::ALL {
            if let Some(stat) = optional(self.read_stat(name, kind))? {
                stats.push(stat);
            }
        }

        Ok(CgroupReport {
            name: name.to_owned(),
            cpu_limit: optional(self.read_cpu_limit(name))?,
            memory_limit: optional(self.read_memory_limit(name))?,
            processes: self.list_processes(name)?,
            stats,
            path,
        })
    }

    fn parent_of(&self, name: &str, path: &Path) -> Result<PathBuf> {
        match path.parent() {
            Some(parent) if path != self.root => Ok(parent.to_path_buf()),
            _ => Err(Error::InvalidName {
                name: name.to_owned(),
            }),
        }
    }

    fn existing_group(&self, name: &str) -> Result<PathBuf> {
        let path = self.group_path(name)?;
        if path.is_dir() {
            Ok(path)
        } else {
            Err(Error::GroupNotFound { path })
        }
    }

    fn write_control(
        &self,
        name: &str,
        file: &str,
        controller: Option<&Controller>,
        contents: &str,
    ) -> Result<()> {
        let group = self.existing_group(name)?;
        if let Some(controller) = controller {
            self.ensure_available(&group, controller)?;
        }

        fsutil::write_existing(group.join(file), contents)
            .map_err(|err| Error::classify(err.path, err.source, &group, controller))?;
        log::info!("Wrote `{contents}` to `{}`", group.join(file).display());
        Ok(())
    }

    /// Fails with [`Error::ControllerNotEnabled`] if `cgroup.controllers` of
    /// `group` does not list `controller`. A group without that file is left
    /// for the write itself to judge.
    fn ensure_available(&self, group: &Path, controller: &Controller) -> Result<()> {
        match self.read_controller_list(group, "cgroup.controllers") {
            Ok(available) if available.contains(controller) => Ok(()),
            Ok(_) => Err(Error::ControllerNotEnabled {
                controller: controller.clone(),
                path: group.to_path_buf(),
            }),
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn read_controller_list(&self, group: &Path, file: &str) -> Result<Vec<Controller>> {
        let path = group.join(file);
        std::fs::read_to_string(&path)
            .map(|contents| parse_controller_list(&contents))
            .map_err(|source| Error::classify(path, source, group, None))
    }

    fn read_file<T>(
        &self,
        group: &Path,
        file: &str,
        controller: Option<&Controller>,
        parse: impl FnOnce(&mut BufReader<File>) -> std::io::Result<T>,
    ) -> Result<T> {
        let path = group.join(file);
        let mut reader = fsutil::open_file_reader(&path)
            .map_err(|err| Error::classify(err.path, err.source, group, controller))?;
        parse(&mut reader).map_err(|source| Error::Io { path, source })
    }
}

/// Maps a disabled controller (or missing optional file) to `None`.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::ControllerNotEnabled { controller, path }) => {
            log::debug!("Skipping `{controller}` for `{}`: not enabled", path.display());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fabricates a group directory with the given interface files.
    fn fake_group(root: &Path, name: &str, controllers: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("cgroup.controllers"), controllers).unwrap();
        std::fs::write(dir.join("cgroup.procs"), "").unwrap();
        for (file, contents) in files {
            std::fs::write(dir.join(file), contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_group_path_validation() {
        let controller = CgroupController::new("/sys/fs/cgroup");
        assert_eq!(controller.group_path("").unwrap(), PathBuf::from("/sys/fs/cgroup"));
        assert_eq!(
            controller.group_path("/bench/g1/").unwrap(),
            PathBuf::from("/sys/fs/cgroup/bench/g1")
        );
        for name in ["..", "a/../b", "a//b", "./a"] {
            assert!(
                matches!(controller.group_path(name), Err(Error::InvalidName { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_create_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let controller = CgroupController::new(root.path());

        let first = controller.create("g1").unwrap();
        let second = controller.create("g1").unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_create_rejects_root_and_missing_parent() {
        let root = tempfile::tempdir().unwrap();
        let controller = CgroupController::new(root.path());

        assert!(matches!(controller.create("/"), Err(Error::InvalidName { .. })));
        assert!(matches!(
            controller.create("missing/child"),
            Err(Error::GroupNotFound { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let root = tempfile::tempdir().unwrap();
        let controller = CgroupController::new(root.path());

        controller.create("empty").unwrap();
        controller.remove("empty").unwrap();
        assert!(!root.path().join("empty").exists());

        assert!(matches!(controller.remove("empty"), Err(Error::GroupNotFound { .. })));

        controller.create("parent").unwrap();
        controller.create("parent/child").unwrap();
        assert!(matches!(controller.remove("parent"), Err(Error::Busy { .. })));
        assert!(root.path().join("parent/child").is_dir());
    }

    #[test]
    fn test_set_cpu_limit() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_group(root.path(), "g1", "cpu memory pids", &[("cpu.max", "max 100000\n")]);
        let controller = CgroupController::new(root.path());

        controller.set_cpu_limit("g1", CpuLimit::new(25_000, 100_000)).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("cpu.max")).unwrap(), "25000 100000");
        assert_eq!(
            controller.read_cpu_limit("g1").unwrap(),
            CpuLimit::new(25_000, 100_000)
        );

        controller.set_cpu_limit("g1", CpuLimit::from_micros(-1, 100_000)).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("cpu.max")).unwrap(), "max 100000");
    }

    #[test]
    fn test_write_without_enabled_controller() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_group(root.path(), "g1", "memory pids", &[("cpu.max", "max 100000\n")]);
        let controller = CgroupController::new(root.path());

        let err = controller
            .set_cpu_limit("g1", CpuLimit::new(50_000, 100_000))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ControllerNotEnabled {
                controller: Controller::Cpu,
                ..
            }
        ));
        assert_eq!(std::fs::read_to_string(dir.join("cpu.max")).unwrap(), "max 100000\n");
    }

    #[test]
    fn test_write_to_missing_interface_file() {
        let root = tempfile::tempdir().unwrap();
        fake_group(root.path(), "g1", "memory", &[]);
        let controller = CgroupController::new(root.path());

        let err = controller
            .set_memory_limit("g1", MemoryLimit::bytes(1 << 20))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ControllerNotEnabled {
                controller: Controller::Memory,
                ..
            }
        ));
        assert!(!root.path().join("g1/memory.max").exists());
    }

    #[test]
    fn test_write_to_missing_group() {
        let root = tempfile::tempdir().unwrap();
        let controller = CgroupController::new(root.path());
        let err = controller.set_pids_max("nope", PidsLimit::count(1)).unwrap_err();
        assert!(matches!(err, Error::GroupNotFound { .. }));
    }

    #[test]
    fn test_set_memory_and_pids_limits() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_group(
            root.path(),
            "g1",
            "memory pids",
            &[("memory.max", "max\n"), ("pids.max", "max\n")],
        );
        let controller = CgroupController::new(root.path());

        controller.set_memory_limit("g1", MemoryLimit::bytes(64 << 20)).unwrap();
        controller.set_pids_max("g1", PidsLimit::count(32)).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("memory.max")).unwrap(), "67108864");
        assert_eq!(std::fs::read_to_string(dir.join("pids.max")).unwrap(), "32");

        controller.set_memory_limit("g1", MemoryLimit::unlimited()).unwrap();
        assert_eq!(controller.read_memory_limit("g1").unwrap(), MemoryLimit::unlimited());
    }

    #[test]
    fn test_set_io_limit_for_path() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_group(root.path(), "g1", "io", &[("io.max", "")]);
        let controller = CgroupController::new(root.path());

        let limit = controller
            .set_io_limit_for_path("g1", root.path(), Some(1_048_576), Some(2_097_152))
            .unwrap();
        let expected = DeviceId::resolve(root.path()).unwrap();
        assert_eq!(limit.device, expected);
        assert_eq!(
            std::fs::read_to_string(dir.join("io.max")).unwrap(),
            format!("{expected} rbps=1048576 wbps=2097152")
        );

        let err = controller
            .set_io_limit_for_path("g1", "/definitely/does/not/exist", None, None)
            .unwrap_err();
        assert!(matches!(err, Error::Device { .. }));
    }

    #[test]
    fn test_add_process_and_move_to_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("cgroup.procs"), "").unwrap();
        let dir = fake_group(root.path(), "g1", "", &[]);
        let controller = CgroupController::new(root.path());

        controller.add_process("g1", 4242).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("cgroup.procs")).unwrap(), "4242");
        assert_eq!(controller.list_processes("g1").unwrap(), vec![4242]);

        controller.move_to_root(4242).unwrap();
        assert_eq!(
            std::fs::read_to_string(root.path().join("cgroup.procs")).unwrap(),
            "4242"
        );
    }

    #[test]
    fn test_enable_controllers() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_group(
            root.path(),
            "bench",
            "cpu io memory pids",
            &[("cgroup.subtree_control", "")],
        );
        let controller = CgroupController::new(root.path());

        controller
            .enable_controllers("bench", &[Controller::Cpu, Controller::Memory])
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.join("cgroup.subtree_control")).unwrap(),
            "+cpu +memory"
        );
        // The kernel reports the enabled set without the `+` prefixes.
        std::fs::write(dir.join("cgroup.subtree_control"), "cpu memory\n").unwrap();
        assert_eq!(
            controller.enabled_controllers("bench").unwrap(),
            vec![Controller::Cpu, Controller::Memory]
        );

        let err = controller
            .enable_controllers("bench", &[Controller::Cpu, Controller::Hugetlb])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ControllerNotEnabled {
                controller: Controller::Hugetlb,
                ..
            }
        ));
    }

    #[test]
    fn test_read_io_stat_sums_devices() {
        let root = tempfile::tempdir().unwrap();
        fake_group(
            root.path(),
            "g1",
            "io",
            &[(
                "io.stat",
                "8:0 rbytes=100 wbytes=200 rios=1 wios=2 dbytes=0 dios=0\n259:0 rbytes=1000 wbytes=2000 rios=10 wios=20 dbytes=0 dios=0\n",
            )],
        );
        let controller = CgroupController::new(root.path());

        let stat = controller.read_io_stat("g1").unwrap();
        assert_eq!((stat.rbytes, stat.wbytes), (1100, 2200));
        assert_eq!((stat.rios, stat.wios), (11, 22));
    }

    #[test]
    fn test_read_memory_stat_unlimited_without_peak() {
        let root = tempfile::tempdir().unwrap();
        fake_group(
            root.path(),
            "g1",
            "memory",
            &[
                ("memory.current", "12288\n"),
                ("memory.max", "max\n"),
                ("memory.stat", "anon 8192\nfile 4096\nkernel 0\n"),
            ],
        );
        let controller = CgroupController::new(root.path());

        let stat = controller.read_memory_stat("g1").unwrap();
        assert_eq!(
            stat,
            MemoryStat {
                current: 12288,
                max: 0,
                peak: 0,
                anon: 8192,
                file: 4096,
            }
        );
    }

    #[test]
    fn test_read_stat_of_disabled_controller() {
        let root = tempfile::tempdir().unwrap();
        fake_group(root.path(), "g1", "memory", &[]);
        let controller = CgroupController::new(root.path());

        let err = controller.read_stat("g1", StatKind::Cpu).unwrap_err();
        assert!(matches!(
            err,
            Error::ControllerNotEnabled {
                controller: Controller::Cpu,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_stat_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        fake_group(root.path(), "g1", "cpu", &[("cpu.stat", "usage_usec lots\n")]);
        let controller = CgroupController::new(root.path());

        match controller.read_cpu_stat("g1").unwrap_err() {
            Error::Io { source, .. } => assert_eq!(source.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_report_skips_disabled_controllers() {
        let root = tempfile::tempdir().unwrap();
        fake_group(
            root.path(),
            "g1",
            "cpu pids",
            &[
                ("cgroup.procs", "10\n11\n"),
                ("cpu.stat", "usage_usec 500\nnr_periods 4\nnr_throttled 1\n"),
                ("cpu.max", "50000 100000\n"),
                ("pids.current", "2\n"),
                ("pids.max", "max\n"),
            ],
        );
        fake_group(root.path(), "g1/child", "", &[]);
        let controller = CgroupController::new(root.path());

        let report = controller.report("g1").unwrap();
        assert_eq!(report.processes, vec![10, 11]);
        assert_eq!(report.cpu_limit, Some(CpuLimit::new(50_000, 100_000)));
        assert_eq!(report.memory_limit, None);
        let kinds: Vec<StatKind> = report.stats.iter().map(CgroupStat::kind).collect();
        assert_eq!(kinds, vec![StatKind::Cpu, StatKind::Pids]);

        assert_eq!(controller.list_groups("g1").unwrap(), vec!["child".to_owned()]);
    }
}

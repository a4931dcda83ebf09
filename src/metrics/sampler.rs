//! Collection of a single [`ProcessSample`] from the proc filesystem.
//!
//! `/proc/<pid>/stat` is the primary source: when it cannot be read the sample
//! fails. Every other file (`comm`, `status`, `statm`, `io`, the socket tables
//! and `/proc/net/dev`) is secondary. A secondary file that cannot be read
//! leaves its fields at zero and is logged at `debug` level; `io` in particular
//! is unreadable for foreign processes without `CAP_SYS_PTRACE`.

use std::time::{Instant, SystemTime};

use super::{Error, ProcessSample, Result};
use crate::environment::HostEnvironment;
use crate::error::ResultOkLogExt;
use crate::procfs::{self, ProcFs};

/// Reads per-process counters for one pid at a time.
#[derive(Debug, Clone)]
pub struct MetricsSampler {
    procfs: ProcFs,
    env: HostEnvironment,
}

impl MetricsSampler {
    pub fn new(procfs: ProcFs, env: HostEnvironment) -> Self {
        Self { procfs, env }
    }

    pub fn environment(&self) -> &HostEnvironment {
        &self.env
    }

    pub fn procfs(&self) -> &ProcFs {
        &self.procfs
    }

    /// Takes a sample of `pid`. Derived rate fields are left at zero.
    ///
    /// # Errors
    ///
    /// - [`Error::ProcessNotFound`] if the process does not exist or exits while
    ///   being sampled.
    /// - [`Error::Sample`] if the primary source exists but cannot be read or parsed.
    pub fn sample(&self, pid: u32) -> Result<ProcessSample> {
        let before = Instant::now();
        let timestamp = SystemTime::now();
        let page_size = self.env.page_size();

        let stat = self
            .procfs
            .read_stat(pid)
            .map_err(|err| Error::from_procfs(pid, err))?;

        let mut vanished = false;
        let mut secondary = |source: &str, result: procfs::Result<_>| match result {
            Ok(value) => Some(value),
            Err(err) => {
                vanished |= err.is_not_found();
                log::debug!("Degraded sample of pid {pid}: {source} unavailable: {err}");
                None
            }
        };

        let comm = secondary("comm", self.procfs.read_comm(pid).map(Secondary::Comm));
        let status = secondary("status", self.procfs.read_status(pid).map(Secondary::Status));
        let statm = secondary("statm", self.procfs.read_statm(pid).map(Secondary::Statm));
        let io = secondary("io", self.procfs.read_io(pid).map(Secondary::Io));
        let connections = secondary(
            "net/tcp",
            self.procfs
                .count_tcp_connections(pid)
                .map(Secondary::Connections),
        );

        // Any secondary read reporting a vanished process is confirmed against
        // the pid directory before the whole sample is discarded.
        if vanished && !self.procfs.pid_dir(pid).exists() {
            return Err(Error::ProcessNotFound { pid });
        }

        let mut sample = ProcessSample::empty(pid, timestamp);
        sample.process_name = stat.comm;
        sample.start_time_ticks = stat.starttime;
        sample.cpu_user_ticks = stat.utime;
        sample.cpu_system_ticks = stat.stime;
        sample.num_threads = stat.num_threads;
        sample.minor_faults = stat.minflt;
        sample.major_faults = stat.majflt;
        sample.mem_vsize_bytes = stat.vsize;
        sample.mem_rss_bytes = stat.rss_pages.saturating_mul(page_size);

        for value in [comm, status, statm, io, connections].into_iter().flatten() {
            value.apply(&mut sample, page_size);
        }

        if let Some(net) = self.procfs.read_net_dev().ok_log_at(log::Level::Debug) {
            sample.net_rx_bytes = net.rx_bytes;
            sample.net_tx_bytes = net.tx_bytes;
            sample.net_rx_packets = net.rx_packets;
            sample.net_tx_packets = net.tx_packets;
        }

        log::trace!(
            "Sampled pid {pid} in {} microseconds",
            before.elapsed().as_micros()
        );
        Ok(sample)
    }
}

/// Result of one secondary source, applied onto the sample once all reads are done.
enum Secondary {
    Comm(String),
    Status(procfs::ProcStatus),
    Statm(procfs::ProcStatm),
    Io(procfs::ProcIo),
    Connections(u64),
}

impl Secondary {
    fn apply(self, sample: &mut ProcessSample, page_size: u64) {
        match self {
            Secondary::Comm(comm) => sample.process_name = comm,
            Secondary::Status(status) => {
                sample.voluntary_ctx_switches = status.voluntary_ctxt_switches;
                sample.nonvoluntary_ctx_switches = status.nonvoluntary_ctxt_switches;
                sample.swap_bytes = status.vm_swap_kb.saturating_mul(1024);
            }
            Secondary::Statm(statm) => {
                sample.mem_rss_bytes = statm.resident.saturating_mul(page_size);
                sample.mem_shared_bytes = statm.shared.saturating_mul(page_size);
            }
            Secondary::Io(io) => {
                sample.io_read_bytes = io.read_bytes;
                sample.io_write_bytes = io.write_bytes;
                sample.io_read_syscalls = io.syscr;
                sample.io_write_syscalls = io.syscw;
                sample.io_cancelled_write_bytes = io.cancelled_write_bytes;
            }
            Secondary::Connections(count) => sample.net_connections = count,
        }
    }
}

//! Isolation Probe: observes and partially controls the resource-isolation
//! primitives of a single Linux host.
//!
//! - [`metrics`] samples the counters of one process and derives CPU and I/O rates.
//! - [`cgroup`] creates cgroup v2 groups, sets their limits and reads their stats.
//! - [`namespace`] groups processes by the kernel namespaces they share.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cgroup::CgroupController;
use config::MonitorConfig;
use environment::HostEnvironment;
use error::ResultOkLogExt;
use metrics::{MetricsSampler, Session};
use namespace::NamespaceRegistry;
use procfs::ProcFs;

pub mod cgroup;
pub mod config;
pub mod environment;
pub mod error;
pub mod fsutil;
pub mod metrics;
pub mod mountinfo;
pub mod namespace;
pub mod procfs;
pub mod statfile;

/// Runs the Isolation Probe binary.
///
/// Samples the process named by the configuration until its session limit is
/// reached, the process exits or Ctrl-C is pressed, then logs a summary.
///
/// # Errors
///
/// Possible errors include:
/// - Missing or invalid `ISOLATION_PROBE_*` environment variables.
/// - The target process not existing when sampling starts.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = MonitorConfig::from_env()?;
    log::debug!("Configuration: {config:?}");

    let env = HostEnvironment::detect_or_fallback();
    if !env.is_privileged() {
        log::warn!(
            "Not running as root: I/O counters of foreign processes and cgroup writes will be unavailable"
        );
    }

    let procfs = ProcFs::new(&config.proc_root);
    let cgroups = match &config.cgroup_root {
        Some(root) => CgroupController::new(root),
        None => CgroupController::detect(procfs.self_mountinfo())
            .ok_log_at(log::Level::Warn)
            .unwrap_or_default(),
    };
    if let Some(controllers) = cgroups.available_controllers("").ok_log_at(log::Level::Debug) {
        let names: Vec<_> = controllers.iter().map(|c| c.name()).collect();
        log::info!(
            "cgroup v2 hierarchy at `{}` offers: {}",
            cgroups.root().display(),
            names.join(" ")
        );
    }

    let registry = NamespaceRegistry::new(procfs.clone());
    if let Some(comparison) = registry
        .compare(std::process::id(), config.pid)
        .ok_log_at(log::Level::Warn)
    {
        log::info!(
            "Pid {} differs from this probe in {} of {} namespaces (isolation: {:?})",
            config.pid,
            comparison.different,
            comparison.compared,
            comparison.isolation
        );
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.ok_log().is_some() {
                log::info!("Interrupted, stopping the session");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let sampler = MetricsSampler::new(procfs, env);
    let session = Session::new(config.interval, config.limit);
    let pid = config.pid;
    let completed =
        tokio::task::spawn_blocking(move || session.run(&sampler, pid, &stop)).await??;

    match completed.history.summary() {
        Some(summary) => log::info!(
            "Session ended ({:?}): {} samples over {:?}, CPU mean {:.1}% / peak {:.1}%, peak RSS {} bytes, read {} bytes, written {} bytes",
            completed.end,
            summary.sample_count,
            summary.duration,
            summary.mean_cpu_percent,
            summary.peak_cpu_percent,
            summary.peak_rss_bytes,
            summary.total_read_bytes,
            summary.total_write_bytes
        ),
        None => log::info!("Session ended ({:?}) without samples", completed.end),
    }

    Ok(())
}

use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sched::unshare;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork};
use serde::Serialize;

use super::{Error, NamespaceKind, Result};

/// Aggregate of repeated creation measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverheadSummary {
    pub kind: NamespaceKind,
    pub attempts: usize,
    pub measured: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

/// Measures the wall time of forking a child that unshares a new namespace of
/// `kind` and exits, up to the parent observing its termination.
///
/// The parent blocks until the child exits; no timeout is applied.
///
/// # Errors
///
/// - [`Error::Unsupported`] if `kind` has no `unshare(2)` flag.
/// - [`Error::Fork`] if no child could be forked. Only this measurement is lost.
/// - [`Error::Creation`] if the child could not create the namespace, usually
///   for lack of privilege or kernel support.
pub fn measure_creation_overhead(kind: &NamespaceKind) -> Result<Duration> {
    let flags = kind.clone_flag().ok_or_else(|| Error::Unsupported { kind: kind.clone() })?;

    let start = Instant::now();
    // SAFETY: the child only calls unshare(2) and _exit(2), both async-signal-safe.
    match unsafe { fork() }.map_err(Error::Fork)? {
        ForkResult::Child => {
            let code = if unshare(flags).is_ok() { 0 } else { 1 };
            // SAFETY: terminates the forked child without running atexit handlers.
            unsafe { nix::libc::_exit(code) }
        }
        ForkResult::Parent { child } => {
            let status = wait_for(child)?;
            let elapsed = start.elapsed();
            match status {
                WaitStatus::Exited(_, 0) => {
                    log::trace!("Created `{kind}` namespace in {elapsed:?}");
                    Ok(elapsed)
                }
                other => Err(Error::Creation {
                    kind: kind.clone(),
                    status: format!("{other:?}"),
                }),
            }
        }
    }
}

fn wait_for(child: Pid) -> Result<WaitStatus> {
    loop {
        match waitpid(child, None) {
            Err(Errno::EINTR) => continue,
            result => return result.map_err(Error::Wait),
        }
    }
}

/// Repeats [`measure_creation_overhead`] `runs` times.
///
/// Fork failures are logged and skip their run; any other failure ends the
/// whole measurement.
///
/// # Errors
///
/// Fails on the first non-fork error, or with [`Error::NoMeasurements`] if
/// no run succeeded.
pub fn measure_creation_overhead_repeated(
    kind: &NamespaceKind,
    runs: usize,
) -> Result<OverheadSummary> {
    let mut durations = Vec::with_capacity(runs);
    for run in 0..runs {
        match measure_creation_overhead(kind) {
            Ok(elapsed) => durations.push(elapsed),
            Err(Error::Fork(errno)) => log::warn!("Run {run}: fork failed: {errno}"),
            Err(err) => return Err(err),
        }
    }

    summarize(kind, runs, &durations).ok_or_else(|| Error::NoMeasurements {
        kind: kind.clone(),
        attempts: runs,
    })
}

fn summarize(kind: &NamespaceKind, attempts: usize, durations: &[Duration]) -> Option<OverheadSummary> {
    let min = *durations.iter().min()?;
    let max = *durations.iter().max()?;
    let total: Duration = durations.iter().sum();
    let mean = total / u32::try_from(durations.len()).unwrap_or(u32::MAX);

    Some(OverheadSummary {
        kind: kind.clone(),
        attempts,
        measured: durations.len(),
        min,
        max,
        mean,
    })
}

use std::process::{Child, Command};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use isolation_probe::environment::HostEnvironment;
use isolation_probe::metrics::{MetricsSampler, Session, SessionEnd, SessionLimit};
use isolation_probe::procfs::ProcFs;

struct Sleeper(Child);

impl Drop for Sleeper {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn sampler() -> MetricsSampler {
    MetricsSampler::new(ProcFs::default(), HostEnvironment::detect_or_fallback())
}

fn busy_loop(duration: Duration) -> u64 {
    let started = std::time::Instant::now();
    let mut counter = 0u64;
    while started.elapsed() < duration {
        counter = std::hint::black_box(counter.wrapping_add(1));
    }
    counter
}

#[test]
fn test_counters_are_monotonic() {
    let sampler = sampler();
    let pid = std::process::id();

    let first = sampler.sample(pid).unwrap();
    busy_loop(Duration::from_millis(50));
    let second = sampler.sample(pid).unwrap();

    assert!(second.same_process(&first));
    assert!(second.cpu_total_ticks() >= first.cpu_total_ticks());
    assert!(second.minor_faults >= first.minor_faults);
    assert!(second.timestamp >= first.timestamp);
}

#[test]
fn test_session_on_child_reaches_sample_limit() {
    let child = Sleeper(Command::new("sleep").arg("30").spawn().unwrap());
    let pid = child.0.id();
    let stop = AtomicBool::new(false);

    let completed = Session::new(Duration::from_millis(20), SessionLimit::Samples(3))
        .with_initial_capacity(1)
        .run(&sampler(), pid, &stop)
        .unwrap();

    assert_eq!(completed.end, SessionEnd::LimitReached);
    assert_eq!(completed.history.len(), 3);
    assert!(completed.history.capacity() >= 3);
    assert!(
        completed
            .history
            .samples()
            .iter()
            .all(|s| s.cpu_percent >= 0.0 && s.pid == pid)
    );

    let export = completed.history.export();
    assert_eq!(export.pid, pid);
    assert!(!export.process_name.is_empty());
    assert_eq!(export.sample_count, 3);
}

#[test]
fn test_session_for_missing_process_fails() {
    let stop = AtomicBool::new(false);
    let result = Session::new(Duration::from_millis(10), SessionLimit::Samples(2)).run(
        &sampler(),
        4_194_305,
        &stop,
    );
    assert!(matches!(
        result,
        Err(isolation_probe::metrics::Error::ProcessNotFound { .. })
    ));
}

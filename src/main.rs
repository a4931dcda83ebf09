/// Entry point for the Isolation Probe.
///
/// Samples one process at a fixed interval and logs a summary of its resource
/// usage, together with the cgroup hierarchy and namespace isolation it sees.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info ISOLATION_PROBE_PID=1234 ISOLATION_PROBE_SAMPLES=30 isolation-probe
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();
    isolation_probe::run().await
}

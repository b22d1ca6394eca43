//! Tracing subscriber setup shared by the benches and the `bench-report` binary.

use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, e.g. `LINKS_BENCH_LOG=linksneo4j=debug`.
pub const LOG_ENV: &str = "LINKS_BENCH_LOG";

/// Installs a stderr subscriber filtered by [`LOG_ENV`], `info` when unset.
///
/// Does nothing when a global subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    init_tracing_with_filter(filter);
}

/// Installs a stderr subscriber with an explicit filter.
pub fn init_tracing_with_filter(filter: impl Into<EnvFilter>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

// 📜 Logging - tracing subscriber setup
//
// RUST_LOG controls the filter (default: info), e.g.
//   RUST_LOG=disclosure_watch=debug

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for binaries. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Verbose logging captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

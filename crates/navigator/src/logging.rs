//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it again after a subscriber is installed does nothing, so test
/// binaries may call it from every test.
pub fn init() {
    init_with_default("info");
}

/// Same as [`init`] with an explicit default directive
pub fn init_with_default(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

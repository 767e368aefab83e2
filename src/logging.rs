//! Tracing subscriber setup shared by both binaries.
//!
//! `RUST_LOG` wins when set; otherwise the caller's default directive is used
//! (`info` for the server, `warn` for the interactive client so log lines do
//! not interleave with the prompt).

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Idempotent; later calls are ignored.
pub fn init(default_directive: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    });
}

/// Test-friendly variant writing through the libtest capture.
pub fn init_for_tests() {
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

//! Subscriber setup for binaries and tests.
//!
//! Library code only emits through the `tracing` macros; nothing here runs
//! unless a host calls [`init_tracing`].

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive, e.g. `grove_discovery=debug`.
pub const LOG_ENV_VAR: &str = "GROVE_LOG";

static INIT: OnceLock<()> = OnceLock::new();

/// Install a formatting subscriber filtered by `GROVE_LOG` (default `info`).
///
/// Safe to call repeatedly; only the first call installs anything, and an
/// already-installed global subscriber is left in place.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

pub fn init_tracing_with_default(default_directive: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    });
}

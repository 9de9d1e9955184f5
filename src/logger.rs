//! Logging setup.
//!
//! Library code logs through the `log` macros; the subscriber installed here
//! picks those records up and writes them to stderr. `RUST_LOG` overrides the
//! default level.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `default_level` applies when `RUST_LOG`
/// is unset or invalid.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

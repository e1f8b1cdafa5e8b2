//! Tracing subscriber setup for the `stab` binary.
//!
//! Log lines go to stderr so tables and JSON on stdout stay pipeable.
//! `RUST_LOG` overrides the default level.

use tracing::metadata::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Install the global subscriber. `verbose` lowers the default level to debug.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn configure_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { DEFAULT_LEVEL };
    let fmt_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_writer(std::io::stderr);
    let level_filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(level_filter_layer)
        .try_init();
}

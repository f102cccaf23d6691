//! Tracing initialization.
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from `--verbose`
//! (debug) or `KIT_LOG_LEVEL` (default `warn`). `KIT_LOG_JSON=1` switches to
//! JSON lines. Diagnostics go to stderr so progress output on stdout stays
//! readable.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let level = if verbose {
        "freebsdvirt_image_kit=debug".to_string()
    } else {
        std::env::var("KIT_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let json = std::env::var("KIT_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };
}

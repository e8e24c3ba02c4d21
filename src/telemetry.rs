//! Log subscriber setup for the `screenask` binary.

use std::io::{self, IsTerminal};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "screenask";

/// Filter used when `RUST_LOG` is unset or unparsable.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{TARGET_PREFIX}={level}")
}

pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Installs a compact stderr logger. Stdout stays reserved for answers.
///
/// Calling it twice is harmless; the second call leaves the first subscriber in place.
pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(verbose)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(layer)
        .try_init();
}

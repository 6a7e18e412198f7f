//! Diagnostic logging setup.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber, logging to stderr.
///
/// `RUST_LOG` takes precedence; otherwise warnings are shown, or debug
/// output for this crate when `verbose` is set. Later calls are no-ops.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,cuerules=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init();
}

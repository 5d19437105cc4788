//! Logging initialization for the CLI.
//!
//! Only the binary installs a subscriber; library code just emits
//! `tracing` events. Logs go to stderr so stdout stays parseable.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level applied to this crate's events
pub fn crate_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` is honored; `verbose` raises this crate to DEBUG, and `json`
/// switches to JSON lines. Returns false if a subscriber was already
/// installed, in which case that one is kept.
pub fn init(verbose: bool, json: bool) -> bool {
    let level = crate_level(verbose);
    let directive = format!("pkglens={level}")
        .parse()
        .unwrap_or_else(|_| level.into());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(directive);

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "keeping existing tracing subscriber");
            false
        }
    }
}

//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate so the resolver crates only emit events.
//! Everything goes to stderr; stdout carries command output only.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose level follows `-v`.
const OWN_TARGETS: &[&str] = &["nobundle_core", "nobundle_cli"];

/// Map the `-v` count to a level: 0 = INFO, 1 = DEBUG, 2+ = TRACE.
fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// `RUST_LOG` (default `warn`) with the nobundle crates raised to the `-v` level.
fn build_filter(verbosity: u8, rust_log: Option<&str>) -> EnvFilter {
    let level = level_for(verbosity);
    let base = rust_log.map_or_else(|| EnvFilter::new("warn"), EnvFilter::new);
    OWN_TARGETS.iter().fold(base, |filter, target| {
        match format!("{target}={level}").parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    })
}

/// Install the global subscriber. With `json`, events are JSON lines.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init(verbosity: u8, json: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let subscriber =
        tracing_subscriber::registry().with(build_filter(verbosity, rust_log.as_deref()));

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

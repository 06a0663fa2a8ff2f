//! Logging initialization for the CLI.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output format for log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` is honoured (default `warn`); each `-v` raises the pkgpatch
/// level: 1 = INFO, 2 = DEBUG, 3+ = TRACE.
pub fn init(verbosity: u8, format: LogFormat) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let level = match verbosity {
        0 => None,
        1 => Some(Level::INFO),
        2 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    };

    if let Some(level) = level
        && let Ok(directive) = format!("pkgpatch={}", level).parse::<Directive>()
    {
        filter = filter.add_directive(directive);
    }

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

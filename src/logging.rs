//! Tracing subscriber setup.
//!
//! Logs always go to stderr so stdout carries nothing but results.

use std::env;

use clap::ValueEnum;
use is_terminal::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{EmulatorError, Result};

pub const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the filter: `RUST_LOG` first, then the configured level, then `warn`.
pub fn filter(level: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level.unwrap_or(DEFAULT_FILTER))
        .map_err(|e| EmulatorError::Config(format!("invalid log level: {}", e)))
}

/// ANSI styling only for terminals, and never when `NO_COLOR` is set.
pub fn use_color(is_terminal: bool) -> bool {
    is_terminal && env::var_os("NO_COLOR").is_none()
}

/// Install the global subscriber.
pub fn init(level: Option<&str>, format: LogFormat) -> Result<()> {
    let filter = filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_ansi(use_color(std::io::stderr().is_terminal()))
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| EmulatorError::Config(format!("failed to initialise logging: {}", e)))
}

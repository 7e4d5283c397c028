//! Error types for the emulator.
//!
//! Every kind is fatal: the binary renders it through miette and exits with
//! status 1. Nothing in the harness retries or recovers locally.

use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EmulatorError {
    /// The handler reference is malformed, or its module or function cannot be found.
    #[error("There was a problem finding your function `{reference}`: {message}")]
    #[diagnostic(
        code(lambda_emu::import),
        help(
            "references look like `module.function` or `package.module.function`; \
             handler libraries are searched for on --handler-path and LAMBDA_EMU_PATH"
        )
    )]
    Import { reference: String, message: String },

    /// The event source could not be read or is not valid JSON.
    #[error("There was a problem parsing your JSON event: {0}")]
    #[diagnostic(
        code(lambda_emu::event),
        help("single mode expects one JSON document; --stream expects one JSON document per line")
    )]
    EventParse(String),

    /// The handler did not return before the deadline.
    #[error("Your lambda timed out! (Timeout was {})", format_timeout(.timeout))]
    #[diagnostic(code(lambda_emu::timeout))]
    Timeout { timeout: Duration },

    /// The handler failed, panicked, or could not accept the event.
    #[error("There was an error running your function: {message}{}", format_trace(.trace))]
    #[diagnostic(
        code(lambda_emu::invoke),
        help(
            "ensure it has a signature like `fn handler(event: E, context: Context) -> Result<R, Err>`"
        )
    )]
    Invocation {
        message: String,
        trace: Option<String>,
    },

    /// Configuration file or option is invalid.
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(lambda_emu::config))]
    Config(String),

    /// Writing results to the output failed.
    #[error("Failed to write output: {0}")]
    #[diagnostic(code(lambda_emu::output))]
    Output(#[from] std::io::Error),
}

impl EmulatorError {
    pub fn import(reference: impl Into<String>, message: impl Into<String>) -> Self {
        EmulatorError::Import {
            reference: reference.into(),
            message: message.into(),
        }
    }
}

/// Whole seconds render as `2s`; anything finer keeps millisecond precision.
pub fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{:.3}s", timeout.as_secs_f64())
    }
}

fn format_trace(trace: &Option<String>) -> String {
    match trace {
        Some(trace) if !trace.trim().is_empty() => format!("\n\n{}", trace.trim_end()),
        _ => String::new(),
    }
}

/// Result type alias using EmulatorError.
pub type Result<T> = std::result::Result<T, EmulatorError>;

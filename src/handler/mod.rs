//! Handlers and the ways they can be named.
//!
//! Sub-modules:
//! - [`reference`] — Parsed `module.function` references.
//! - [`registry`]  — In-process table of registered handler modules.
//! - [`library`]   — Handler tables exported by dynamic libraries.
//! - [`builtin`]   — Handlers shipped with the binary.

pub mod builtin;
pub mod library;
pub mod reference;
pub mod registry;

pub use lambda_handler::{Context, FailureKind};
pub use library::{HandlerLibrary, LibraryHandler};
pub use reference::HandlerReference;
pub use registry::{HandlerRegistry, TypedHandler};

use serde_json::Value;
use std::fmt;

/// A resolved handler: `(event, context) -> result`.
///
/// Handlers are shared read-only with the worker thread carrying each call,
/// hence `Send + Sync`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, event: Value, context: Context) -> Result<Value, HandlerFailure>;
}

/// A handler call that produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub kind: FailureKind,
    pub message: String,
    pub trace: Option<String>,
}

impl HandlerFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

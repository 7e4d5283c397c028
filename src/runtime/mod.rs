//! Execution harness.
//!
//! Sub-modules:
//! - [`executor`] — Event dispatch loop; coordinates all sub-modules.
//! - [`loader`]   — Handler resolution from registries and libraries.
//! - [`invoker`]  — Handler invocation with timeout protection.
//! - [`sampler`]  — Peak resident memory sampling.
//! - [`parser`]   — Event sources and JSON event parsing.
//! - [`result`]   — Invocation outcome type.
//! - [`reporter`] — Rendering results and stream progress.

pub mod executor;
pub mod invoker;
pub mod loader;
pub mod parser;
pub mod reporter;
pub mod result;
pub mod sampler;

pub use executor::{DispatchMode, EventDispatcher};
pub use invoker::{Completed, TimeoutInvoker};
pub use loader::HandlerResolver;
pub use parser::EventSource;
pub use reporter::{ConsoleReporter, Reporter};
pub use result::InvocationOutcome;
pub use sampler::{PeakMemorySampler, ProcessSampler, ScriptedSampler};

//! Run serverless function handlers locally.
//!
//! `lambda-emu` resolves a handler from a dotted `module.function` reference,
//! invokes it with a JSON event under a hard wall-clock timeout, and reports
//! the result together with timing and peak-memory estimates. Stream mode
//! replays a line-delimited JSON file against the same loaded handler.
//!
//! Programs can embed the emulator with their own [`HandlerRegistry`]:
//!
//! ```ignore
//! use clap::Parser;
//! use lambda_emu::cli::{commands, Cli};
//! use lambda_emu::{config::Config, Context, HandlerRegistry};
//!
//! fn main() -> miette::Result<()> {
//!     let cli = Cli::parse();
//!     let config = Config::load(cli.config.as_deref())?;
//!     let mut registry = HandlerRegistry::new();
//!     registry.register("mathlib.square", |x: i64, _ctx: Context| Ok::<_, String>(x * x))?;
//!     commands::run(cli, config, registry)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod runtime;

pub use error::{EmulatorError, Result};
pub use handler::{Context, Handler, HandlerReference, HandlerRegistry};
pub use runtime::{EventDispatcher, HandlerResolver, InvocationOutcome, TimeoutInvoker};

//! Handlers shipped with the `lambda-emu` binary.
//!
//! `builtin.echo` returns its event unchanged, which is handy for checking
//! that an event file or stream parses the way you expect.

use std::convert::Infallible;

use serde_json::Value;

use super::{Context, HandlerRegistry};
use crate::Result;

pub const MODULE: &str = "builtin";

pub fn echo(event: Value, _ctx: Context) -> std::result::Result<Value, Infallible> {
    Ok(event)
}

/// A registry holding the builtin module.
pub fn registry() -> Result<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register("builtin.echo", echo)?;
    Ok(registry)
}

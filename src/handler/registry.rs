//! In-process handler registry.
//!
//! The registry maps module paths to tables of named handlers. Programs that
//! embed the emulator register their handlers here instead of shipping a
//! dynamic library.
//!
//! # Example
//!
//! ```ignore
//! use lambda_emu::handler::{Context, HandlerRegistry};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Point { x: i64 }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("mathlib.square", |event: Point, _ctx: Context| {
//!     Ok::<_, String>(event.x * event.x)
//! })?;
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Context, FailureKind, Handler, HandlerFailure, HandlerReference};
use crate::Result;

/// Wrapper that deserializes the event before calling the handler.
pub struct TypedHandler<F, E, R, Err> {
    handler: F,
    _phantom: PhantomData<fn(E) -> (R, Err)>,
}

impl<F, E, R, Err> TypedHandler<F, E, R, Err>
where
    F: Fn(E, Context) -> std::result::Result<R, Err> + Send + Sync + 'static,
    E: DeserializeOwned + 'static,
    R: Serialize + 'static,
    Err: Display + 'static,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, E, R, Err> Handler for TypedHandler<F, E, R, Err>
where
    F: Fn(E, Context) -> std::result::Result<R, Err> + Send + Sync + 'static,
    E: DeserializeOwned + 'static,
    R: Serialize + 'static,
    Err: Display + 'static,
{
    fn call(&self, event: Value, context: Context) -> std::result::Result<Value, HandlerFailure> {
        // An event that does not fit `E` is the typed equivalent of a
        // signature mismatch.
        let event: E = serde_path_to_error::deserialize(event)
            .map_err(|e| HandlerFailure::new(FailureKind::BadEvent, e.to_string()))?;

        let result = (self.handler)(event, context)
            .map_err(|e| HandlerFailure::new(FailureKind::Handled, e.to_string()))?;

        serde_json::to_value(result).map_err(|e| {
            HandlerFailure::new(
                FailureKind::Handled,
                format!("result is not serializable: {}", e),
            )
        })
    }
}

/// Registry mapping module paths to their handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    modules: BTreeMap<String, BTreeMap<String, Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler under a dotted reference.
    pub fn register<F, E, R, Err>(&mut self, reference: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn(E, Context) -> std::result::Result<R, Err> + Send + Sync + 'static,
        E: DeserializeOwned + 'static,
        R: Serialize + 'static,
        Err: Display + 'static,
    {
        self.register_handler(reference, Arc::new(TypedHandler::new(handler)))
    }

    /// Register an already-built handler under a dotted reference.
    pub fn register_handler(
        &mut self,
        reference: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<&mut Self> {
        let reference = HandlerReference::parse(reference)?;
        self.modules
            .entry(reference.module().to_string())
            .or_default()
            .insert(reference.function().to_string(), handler);
        Ok(self)
    }

    /// Whether any handler was registered under this module path.
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Look up a handler; `None` when either the module or the function is absent.
    pub fn get(&self, reference: &HandlerReference) -> Option<Arc<dyn Handler>> {
        self.modules
            .get(reference.module())
            .and_then(|functions| functions.get(reference.function()))
            .cloned()
    }

    /// Function names registered under a module, in sorted order.
    pub fn functions(&self, module: &str) -> Vec<&str> {
        self.modules
            .get(module)
            .map(|functions| functions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Registered module paths, in sorted order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

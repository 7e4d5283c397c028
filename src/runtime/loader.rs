//! Handler resolution.
//!
//! Turns a [`HandlerReference`] into a callable handler. Registered modules
//! win; otherwise the module path is mapped onto the handler search path and
//! the matching dynamic library is loaded:
//!
//! ```text
//! pkg.jobs.handle  ->  <search dir>/pkg/libjobs.so  (function `handle`)
//! ```
//!
//! It intentionally has **no** knowledge of events or invocation.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::handler::{Handler, HandlerLibrary, HandlerReference, HandlerRegistry};
use crate::{EmulatorError, Result};

/// Resolves handler references against a registry and a library search path.
pub struct HandlerResolver {
    registry: HandlerRegistry,
    search_paths: Vec<PathBuf>,
}

impl HandlerResolver {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            search_paths: Vec::new(),
        }
    }

    /// Directories searched for handler libraries, in order.
    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve `reference` into a handler.
    ///
    /// Fails with [`EmulatorError::Import`] when the module cannot be found or
    /// loaded, or when it has no function by that name.
    #[tracing::instrument(skip_all, fields(reference = %reference))]
    pub fn resolve(&self, reference: &HandlerReference) -> Result<Arc<dyn Handler>> {
        let module = reference.module();
        let function = reference.function();

        if self.registry.has_module(module) {
            debug!("Resolving from registered module");
            return self.registry.get(reference).ok_or_else(|| {
                missing_function(reference, &self.registry.functions(module))
            });
        }

        let path = self.locate(reference).ok_or_else(|| {
            EmulatorError::import(
                reference.as_str(),
                format!(
                    "No module named '{}' (searched {})",
                    module,
                    describe_search(&self.search_paths)
                ),
            )
        })?;

        let library =
            HandlerLibrary::open(&path).map_err(|e| EmulatorError::import(reference.as_str(), e))?;
        let handler = library.handler(function).ok_or_else(|| {
            let names: Vec<&str> = library.names().iter().map(String::as_str).collect();
            missing_function(reference, &names)
        })?;

        info!(library = %library.path().display(), "Resolved handler");
        Ok(Arc::new(handler))
    }

    /// First existing library file for the reference's module on the search path.
    pub fn locate(&self, reference: &HandlerReference) -> Option<PathBuf> {
        let relative = library_relative_path(reference);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&relative))
            .inspect(|candidate| debug!(candidate = %candidate.display(), "Probing"))
            .find(|candidate| candidate.is_file())
    }
}

/// `pkg.jobs` becomes `pkg/<platform filename for "jobs">`.
pub fn library_relative_path(reference: &HandlerReference) -> PathBuf {
    let segments: Vec<&str> = reference.module_segments().collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return PathBuf::from(libloading::library_filename(reference.module())),
    };
    let mut path: PathBuf = parents.iter().collect();
    path.push(libloading::library_filename(last));
    path
}

fn missing_function(reference: &HandlerReference, available: &[&str]) -> EmulatorError {
    let mut message = format!(
        "module '{}' has no attribute '{}'",
        reference.module(),
        reference.function()
    );
    if !available.is_empty() {
        message.push_str(&format!(" (available: {})", available.join(", ")));
    }
    EmulatorError::import(reference.as_str(), message)
}

fn describe_search(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no handler paths".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

//! Handlers exported by dynamic libraries.
//!
//! A handler library exports the table generated by
//! `lambda_handler::export_handlers!`. Opening the library runs its
//! initializers; the manifest is read once and the invoke/free entry points
//! are kept alongside a shared handle so they stay valid for as long as any
//! handler from the library is alive.

use std::ffi::{c_char, CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lambda_handler::{
    manifest_names, Envelope, FailureKind, FreeFn, InvokeFn, ManifestFn, FREE_SYMBOL,
    INVOKE_SYMBOL, MANIFEST_SYMBOL,
};
use libloading::Library;
use serde_json::Value;
use tracing::debug;

use super::{Context, Handler, HandlerFailure};

/// An opened handler library.
pub struct HandlerLibrary {
    path: PathBuf,
    library: Arc<Library>,
    invoke: InvokeFn,
    free: FreeFn,
    names: Vec<String>,
}

impl HandlerLibrary {
    /// Load the library at `path` and read its handler manifest.
    pub fn open(path: &Path) -> Result<Self, String> {
        // SAFETY: loading a library runs its initializers; that is the
        // documented contract of a handler library.
        let library = unsafe { Library::new(path) }
            .map_err(|e| format!("failed to load {}: {}", path.display(), e))?;

        let not_a_handler_library = |e: libloading::Error| {
            format!(
                "{} is not a handler library (missing handler table: {})",
                path.display(),
                e
            )
        };

        // SAFETY: the symbol types match the ABI emitted by `export_handlers!`.
        let (manifest, invoke, free) = unsafe {
            let manifest: ManifestFn = *library
                .get::<ManifestFn>(MANIFEST_SYMBOL)
                .map_err(not_a_handler_library)?;
            let invoke: InvokeFn = *library
                .get::<InvokeFn>(INVOKE_SYMBOL)
                .map_err(not_a_handler_library)?;
            let free: FreeFn = *library
                .get::<FreeFn>(FREE_SYMBOL)
                .map_err(not_a_handler_library)?;
            (manifest, invoke, free)
        };

        // SAFETY: the manifest is a static NUL-terminated string.
        let raw_manifest = unsafe {
            let ptr = manifest();
            if ptr.is_null() {
                return Err(format!("{} returned a null manifest", path.display()));
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        };
        let names: Vec<String> = manifest_names(&raw_manifest).map(str::to_string).collect();
        debug!(path = %path.display(), handlers = ?names, "Loaded handler library");

        Ok(Self {
            path: path.to_path_buf(),
            library: Arc::new(library),
            invoke,
            free,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names listed in the library's manifest.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The named handler, if the manifest lists it.
    pub fn handler(&self, name: &str) -> Option<LibraryHandler> {
        if !self.names.iter().any(|n| n == name) {
            return None;
        }
        Some(LibraryHandler {
            _library: Arc::clone(&self.library),
            name: CString::new(name).ok()?,
            invoke: self.invoke,
            free: self.free,
        })
    }
}

/// One handler inside a loaded library.
pub struct LibraryHandler {
    _library: Arc<Library>,
    name: CString,
    invoke: InvokeFn,
    free: FreeFn,
}

impl Handler for LibraryHandler {
    fn call(&self, event: Value, context: Context) -> Result<Value, HandlerFailure> {
        let encode = |value: String| {
            CString::new(value)
                .map_err(|e| HandlerFailure::new(FailureKind::BadEvent, e.to_string()))
        };
        let event = encode(event.to_string())?;
        let context = serde_json::to_string(&context)
            .map_err(|e| HandlerFailure::new(FailureKind::BadEvent, e.to_string()))
            .and_then(encode)?;

        // SAFETY: all three pointers are valid NUL-terminated strings for the
        // duration of the call, and the returned string is released through
        // the library's own free entry point.
        let raw = unsafe {
            let ptr: *mut c_char = (self.invoke)(self.name.as_ptr(), event.as_ptr(), context.as_ptr());
            if ptr.is_null() {
                return Err(HandlerFailure::new(
                    FailureKind::Handled,
                    "handler library returned no result",
                ));
            }
            let raw = CStr::from_ptr(ptr).to_string_lossy().into_owned();
            (self.free)(ptr);
            raw
        };

        match serde_json::from_str::<Envelope>(&raw) {
            Ok(Envelope::Ok(value)) => Ok(value),
            Ok(Envelope::Error {
                kind,
                message,
                trace,
            }) => {
                let failure = HandlerFailure::new(kind, message);
                Err(match trace {
                    Some(trace) => failure.with_trace(trace),
                    None => failure,
                })
            }
            Err(e) => Err(HandlerFailure::new(
                FailureKind::Handled,
                format!("handler library returned a malformed result: {}", e),
            )
            .with_trace(raw)),
        }
    }
}

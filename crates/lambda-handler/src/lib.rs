//! Author-side support for lambda-emu handler libraries.
//!
//! A handler library is a `cdylib` that exports a small C ABI table:
//!
//! - `lambda_handler_manifest`: newline-separated names of the exported handlers.
//! - `lambda_handler_invoke`: calls one handler by name with JSON-encoded
//!   `(event, context)` and returns a JSON [`Envelope`].
//! - `lambda_handler_free`: releases a string returned by `lambda_handler_invoke`.
//!
//! The table is generated by [`export_handlers!`]; handler authors only write
//! ordinary Rust functions:
//!
//! ```ignore
//! use lambda_handler::{export_handlers, Context};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Point { x: i64 }
//!
//! fn square(event: Point, _ctx: Context) -> Result<i64, String> {
//!     Ok(event.x * event.x)
//! }
//!
//! export_handlers! {
//!     square => square,
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Symbol listing the handlers a library exports.
pub const MANIFEST_SYMBOL: &[u8] = b"lambda_handler_manifest\0";
/// Symbol dispatching a call to a named handler.
pub const INVOKE_SYMBOL: &[u8] = b"lambda_handler_invoke\0";
/// Symbol releasing strings returned by the invoke symbol.
pub const FREE_SYMBOL: &[u8] = b"lambda_handler_free\0";

pub type ManifestFn = unsafe extern "C" fn() -> *const std::ffi::c_char;
pub type InvokeFn = unsafe extern "C" fn(
    name: *const std::ffi::c_char,
    event: *const std::ffi::c_char,
    context: *const std::ffi::c_char,
) -> *mut std::ffi::c_char;
pub type FreeFn = unsafe extern "C" fn(ptr: *mut std::ffi::c_char);

/// Invocation context handed to every handler.
///
/// Currently a placeholder: it carries no fields and crosses the library
/// boundary as JSON `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context;

/// Why a handler call produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The handler returned an error.
    Handled,
    /// The handler panicked.
    Panic,
    /// The event (or context) did not deserialize into the handler's argument types.
    BadEvent,
    /// No handler with the requested name is exported.
    UnknownFunction,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Handled => "handler returned an error",
            FailureKind::Panic => "handler panicked",
            FailureKind::BadEvent => "event does not match handler signature",
            FailureKind::UnknownFunction => "unknown handler",
        };
        write!(f, "{}", s)
    }
}

/// Wire result of one `lambda_handler_invoke` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    Ok(Value),
    Error {
        kind: FailureKind,
        message: String,
        /// Panic location and backtrace, when the handler panicked.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace: Option<String>,
    },
}

impl Envelope {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Envelope::Error {
            kind,
            message: message.into(),
            trace: None,
        }
    }

    pub fn panic(message: impl Into<String>, trace: Option<String>) -> Self {
        Envelope::Error {
            kind: FailureKind::Panic,
            message: message.into(),
            trace,
        }
    }
}

/// Split a raw manifest into handler names, skipping blank entries.
pub fn manifest_names(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|name| !name.is_empty())
}

/// Generate the handler table ABI for the listed functions.
///
/// Each entry is `exported_name => path::to::function`, where the function has
/// the shape `fn(E, Context) -> Result<R, Err>` with `E: DeserializeOwned`,
/// `R: Serialize` and `Err: Display`.
#[macro_export]
macro_rules! export_handlers {
    ($($name:ident => $func:path),+ $(,)?) => {
        #[no_mangle]
        pub extern "C" fn lambda_handler_manifest() -> *const ::std::ffi::c_char {
            concat!($(stringify!($name), "\n",)+ "\0").as_ptr().cast()
        }

        /// # Safety
        ///
        /// All pointers must be valid NUL-terminated strings.
        #[no_mangle]
        pub unsafe extern "C" fn lambda_handler_invoke(
            name: *const ::std::ffi::c_char,
            event: *const ::std::ffi::c_char,
            context: *const ::std::ffi::c_char,
        ) -> *mut ::std::ffi::c_char {
            let name = $crate::__private::read_str(name);
            match name.as_str() {
                $(stringify!($name) => $crate::__private::invoke(event, context, $func),)+
                other => $crate::__private::unknown(other),
            }
        }

        /// # Safety
        ///
        /// `ptr` must come from `lambda_handler_invoke` of this library.
        #[no_mangle]
        pub unsafe extern "C" fn lambda_handler_free(ptr: *mut ::std::ffi::c_char) {
            $crate::__private::free(ptr)
        }
    };
}

#[doc(hidden)]
pub mod __private {
    use super::{Context, Envelope, FailureKind};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::backtrace::Backtrace;
    use std::cell::{Cell, RefCell};
    use std::ffi::{c_char, CStr, CString};
    use std::fmt::Display;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Once;

    thread_local! {
        static CAPTURING: Cell<bool> = const { Cell::new(false) };
        static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
    }

    static HOOK: Once = Once::new();

    /// Route panics raised inside [`call`] into a stashed report instead of
    /// the library's default hook; other panics go to the previous hook.
    fn install_panic_hook() {
        HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if CAPTURING.with(Cell::get) {
                    let report =
                        format!("{}\n\nstack backtrace:\n{}", info, Backtrace::force_capture());
                    LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
                } else {
                    previous(info);
                }
            }));
        });
    }

    /// # Safety
    ///
    /// `ptr` must be null or a valid NUL-terminated string.
    pub unsafe fn read_str(ptr: *const c_char) -> String {
        if ptr.is_null() {
            return String::new();
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }

    /// # Safety
    ///
    /// `event` and `context` must be null or valid NUL-terminated strings.
    pub unsafe fn invoke<E, R, Err, F>(
        event: *const c_char,
        context: *const c_char,
        handler: F,
    ) -> *mut c_char
    where
        E: DeserializeOwned,
        R: Serialize,
        Err: Display,
        F: FnOnce(E, Context) -> Result<R, Err>,
    {
        let event = read_str(event);
        let context = read_str(context);
        into_raw(&call(&event, &context, handler))
    }

    pub fn call<E, R, Err, F>(event: &str, context: &str, handler: F) -> Envelope
    where
        E: DeserializeOwned,
        R: Serialize,
        Err: Display,
        F: FnOnce(E, Context) -> Result<R, Err>,
    {
        let event: E = match serde_json::from_str(event) {
            Ok(event) => event,
            Err(e) => return Envelope::failure(FailureKind::BadEvent, e.to_string()),
        };
        let context: Context = if context.trim().is_empty() {
            Context
        } else {
            match serde_json::from_str(context) {
                Ok(context) => context,
                Err(e) => return Envelope::failure(FailureKind::BadEvent, e.to_string()),
            }
        };

        // Unwinding across the extern "C" boundary aborts the host.
        install_panic_hook();
        CAPTURING.with(|c| c.set(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(event, context)));
        CAPTURING.with(|c| c.set(false));

        match outcome {
            Ok(Ok(value)) => match serde_json::to_value(value) {
                Ok(value) => Envelope::Ok(value),
                Err(e) => Envelope::failure(
                    FailureKind::Handled,
                    format!("result is not serializable: {}", e),
                ),
            },
            Ok(Err(err)) => Envelope::failure(FailureKind::Handled, err.to_string()),
            Err(payload) => Envelope::panic(
                panic_message(payload.as_ref()),
                LAST_PANIC.with(|slot| slot.borrow_mut().take()),
            ),
        }
    }

    pub fn unknown(name: &str) -> *mut c_char {
        into_raw(&Envelope::failure(
            FailureKind::UnknownFunction,
            format!("no handler named '{}'", name),
        ))
    }

    /// # Safety
    ///
    /// `ptr` must be null or come from [`into_raw`] in this library.
    pub unsafe fn free(ptr: *mut c_char) {
        if !ptr.is_null() {
            drop(CString::from_raw(ptr));
        }
    }

    fn into_raw(envelope: &Envelope) -> *mut c_char {
        // serde_json escapes NUL, so the encoded envelope never contains one.
        let encoded = serde_json::to_string(envelope).unwrap_or_else(|e| {
            format!(
                r#"{{"error":{{"kind":"handled","message":"envelope encoding failed: {}"}}}}"#,
                e
            )
        });
        CString::new(encoded).unwrap_or_default().into_raw()
    }

    pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        }
    }
}

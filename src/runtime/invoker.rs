//! Handler invocation with timeout protection.
//!
//! Each call runs on a dedicated worker thread while the calling thread waits
//! on a deadline-bounded channel:
//!
//! ```text
//! Idle -> Running -> Completed | TimedOut | Crashed
//! ```
//!
//! The handler gets no say in cancellation. When the deadline passes the
//! caller stops waiting and reports a timeout immediately, even if the
//! handler is spinning in a tight loop. A thread cannot be killed safely, so
//! the timed-out worker is detached and leaked; on the CLI path the process
//! exits right after.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::handler::{Context, FailureKind, Handler, HandlerFailure};
use crate::{EmulatorError, Result};

const WORKER_PREFIX: &str = "lambda-invoke-";

/// A handler call that returned in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub result: Value,
    /// Wall-clock time measured on the worker, strictly around the call.
    pub elapsed: Duration,
}

enum WorkerReport {
    Completed(Completed),
    Crashed(HandlerFailure),
}

/// Calls handlers under a hard wall-clock deadline.
#[derive(Debug)]
pub struct TimeoutInvoker {
    timeout: Duration,
    requests: AtomicU64,
}

impl TimeoutInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            requests: AtomicU64::new(0),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke `handler` with `(event, context)`.
    ///
    /// Returns the handler's value and elapsed time, or fails with
    /// [`EmulatorError::Timeout`] once the deadline passes, or with
    /// [`EmulatorError::Invocation`] if the handler errors or panics.
    #[tracing::instrument(skip_all, fields(request = tracing::field::Empty))]
    pub fn invoke(
        &self,
        handler: &Arc<dyn Handler>,
        event: Value,
        context: Context,
    ) -> Result<Completed> {
        panic_capture::install();

        let request = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::Span::current().record("request", request);

        // Capacity 1: the worker's single send never blocks, even after the
        // caller has given up on it.
        let (tx, rx) = mpsc::sync_channel::<WorkerReport>(1);
        let worker_handler = Arc::clone(handler);

        let worker = thread::Builder::new()
            .name(format!("{}{}", WORKER_PREFIX, request))
            .spawn(move || {
                let started = Instant::now();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    worker_handler.call(event, context)
                }));
                let elapsed = started.elapsed();

                let report = match outcome {
                    Ok(Ok(result)) => WorkerReport::Completed(Completed { result, elapsed }),
                    Ok(Err(failure)) => WorkerReport::Crashed(failure),
                    Err(payload) => {
                        let failure = HandlerFailure::new(
                            FailureKind::Panic,
                            panic_message(payload.as_ref()),
                        );
                        WorkerReport::Crashed(match panic_capture::take() {
                            Some(trace) => failure.with_trace(trace),
                            None => failure,
                        })
                    }
                };
                let _ = tx.send(report);
            })
            .map_err(|e| EmulatorError::Invocation {
                message: format!("failed to start invocation worker: {}", e),
                trace: None,
            })?;
        debug!(timeout = ?self.timeout, "Invocation running");

        match rx.recv_timeout(self.timeout) {
            Ok(WorkerReport::Completed(completed)) => {
                let _ = worker.join();
                debug!(elapsed = ?completed.elapsed, "Invocation completed");
                Ok(completed)
            }
            Ok(WorkerReport::Crashed(failure)) => {
                let _ = worker.join();
                warn!(kind = ?failure.kind, "Invocation crashed");
                Err(EmulatorError::Invocation {
                    message: failure.to_string(),
                    trace: failure.trace,
                })
            }
            Err(RecvTimeoutError::Timeout) => {
                error!(timeout = ?self.timeout, "Invocation timed out; abandoning worker");
                // Dropping the JoinHandle detaches the worker.
                drop(worker);
                Err(EmulatorError::Timeout {
                    timeout: self.timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.join();
                Err(EmulatorError::Invocation {
                    message: "invocation worker exited without reporting a result".to_string(),
                    trace: None,
                })
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Captures panic locations and backtraces raised on invocation workers.
///
/// The default hook would print the panic straight to stderr; on workers the
/// report is instead stashed for the invoker, which folds it into the
/// invocation failure. Panics on any other thread go to the previous hook.
mod panic_capture {
    use super::*;

    thread_local! {
        static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
    }

    static INSTALL: Once = Once::new();

    pub(super) fn install() {
        INSTALL.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                let on_worker = thread::current()
                    .name()
                    .is_some_and(|name| name.starts_with(WORKER_PREFIX));
                if on_worker {
                    let report = format!("{}\n\nstack backtrace:\n{}", info, Backtrace::force_capture());
                    LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
                } else {
                    previous(info);
                }
            }));
        });
    }

    pub(super) fn take() -> Option<String> {
        LAST_PANIC.with(|slot| slot.borrow_mut().take())
    }
}

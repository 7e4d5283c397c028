use std::io::BufRead;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::invoker::TimeoutInvoker;
use super::parser::{read_event, EventSource, StreamLines};
use super::reporter::Reporter;
use super::result::InvocationOutcome;
use super::sampler::{peak_delta, PeakMemorySampler, ProcessSampler};
use crate::handler::{Context, Handler};
use crate::Result;

/// How the event source is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// The whole source is one JSON event.
    Single,
    /// Every non-blank line is its own JSON event.
    Stream,
}

impl DispatchMode {
    pub fn from_stream_flag(stream: bool) -> Self {
        if stream {
            DispatchMode::Stream
        } else {
            DispatchMode::Single
        }
    }
}

/// Drives invocations of one loaded handler.
///
/// Invocations run strictly one after another: a record is fully invoked (or
/// fails) before the next one is read.
pub struct EventDispatcher<S = ProcessSampler> {
    handler: Arc<dyn Handler>,
    invoker: TimeoutInvoker,
    sampler: S,
}

impl EventDispatcher<ProcessSampler> {
    pub fn new(handler: Arc<dyn Handler>, invoker: TimeoutInvoker) -> Self {
        Self::with_sampler(handler, invoker, ProcessSampler)
    }
}

impl<S: PeakMemorySampler> EventDispatcher<S> {
    pub fn with_sampler(handler: Arc<dyn Handler>, invoker: TimeoutInvoker, sampler: S) -> Self {
        Self {
            handler,
            invoker,
            sampler,
        }
    }

    /// Run in the chosen mode; returns the number of invocations made.
    pub fn dispatch(
        &self,
        mode: DispatchMode,
        source: &EventSource,
        reporter: &mut impl Reporter,
    ) -> Result<usize> {
        match mode {
            DispatchMode::Single => self.run_single(source, reporter).map(|()| 1),
            DispatchMode::Stream => self.run_stream(source, reporter),
        }
    }

    /// Read one JSON event from `source` and invoke once.
    pub fn run_single(&self, source: &EventSource, reporter: &mut impl Reporter) -> Result<()> {
        let event = read_event(source)?;
        let outcome = self.execute(event)?;
        reporter.outcome(&outcome)?;
        Ok(())
    }

    /// Invoke once per line of `source`; the first bad record aborts the run.
    pub fn run_stream(&self, source: &EventSource, reporter: &mut impl Reporter) -> Result<usize> {
        info!(%source, "Entering stream mode");
        reporter.stream_started()?;
        let reader = source.open()?;
        self.run_stream_from(reader, reporter)
    }

    /// Stream-mode loop over any buffered reader.
    pub fn run_stream_from<R: BufRead>(
        &self,
        reader: R,
        reporter: &mut impl Reporter,
    ) -> Result<usize> {
        let mut dispatched = 0;
        for line in StreamLines::new(reader) {
            let line = line?;
            reporter.record_started(line.sequence, &line.raw)?;
            let event = line.parse()?;
            let outcome = self.execute(event)?;
            reporter.outcome(&outcome)?;
            dispatched += 1;
        }
        info!(records = dispatched, "Stream exhausted");
        Ok(dispatched)
    }

    /// One invocation bracketed by peak-memory samples.
    ///
    /// The previous record's event and outcome are dropped before this is
    /// called, so their memory is already released; there is no collector to
    /// run in between.
    pub fn execute(&self, event: Value) -> Result<InvocationOutcome> {
        let before = self.sampler.sample_peak_rss();
        let completed = self.invoker.invoke(&self.handler, event, Context)?;
        let after = self.sampler.sample_peak_rss();

        let outcome = InvocationOutcome {
            result: completed.result,
            elapsed: completed.elapsed,
            peak_rss_delta: peak_delta(before, after),
        };
        debug!(
            elapsed = ?outcome.elapsed,
            peak_rss_delta = outcome.peak_rss_delta,
            "Invocation measured"
        );
        Ok(outcome)
    }
}

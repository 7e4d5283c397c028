//! Rendering invocation results.
//!
//! Results go to stdout, one compact JSON line per invocation. Verbose mode
//! prefixes each result with the handler that ran and its timing and memory
//! estimates.

use std::io::{self, Write};

use colored::Colorize;
use indicatif::HumanBytes;

use super::parser::preview;
use super::result::InvocationOutcome;

const RESULT_RULE: &str = "----------------------RESULT----------------------";

/// Receives dispatch progress and outcomes.
pub trait Reporter {
    /// Stream mode is about to read its first record.
    fn stream_started(&mut self) -> io::Result<()>;

    /// A stream record is about to be parsed and invoked.
    fn record_started(&mut self, sequence: usize, raw: &str) -> io::Result<()>;

    /// An invocation completed.
    fn outcome(&mut self, outcome: &InvocationOutcome) -> io::Result<()>;
}

/// Writes the human-facing report to any writer, usually stdout.
pub struct ConsoleReporter<W> {
    out: W,
    handler: String,
    verbose: bool,
    color: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, handler: impl Into<String>, verbose: bool) -> Self {
        Self {
            out,
            handler: handler.into(),
            verbose,
            color: false,
        }
    }

    /// Style verbose labels with ANSI colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn label(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn rule(&self) -> String {
        if self.color {
            RESULT_RULE.dimmed().to_string()
        } else {
            RESULT_RULE.to_string()
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn stream_started(&mut self) -> io::Result<()> {
        writeln!(self.out, "Entering stream mode.")
    }

    fn record_started(&mut self, sequence: usize, raw: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Object {} {}", sequence, preview(raw))?;
        self.out.flush()
    }

    fn outcome(&mut self, outcome: &InvocationOutcome) -> io::Result<()> {
        if self.verbose {
            let executed = self.label("Executed");
            let rule = self.rule();
            writeln!(self.out, "{} {}", executed, self.handler)?;
            writeln!(self.out, "Estimated...")?;
            writeln!(
                self.out,
                "...execution clock time:\t\t {:.6} seconds ({} ms) ({} ms bucket)",
                outcome.elapsed_secs(),
                outcome.elapsed_millis(),
                outcome.billed_millis()
            )?;
            writeln!(
                self.out,
                "...execution peak RSS memory:\t\t {} ({} bytes)",
                HumanBytes(outcome.peak_rss_delta),
                outcome.peak_rss_delta
            )?;
            writeln!(self.out, "{}", rule)?;
        }
        serde_json::to_writer(&mut self.out, &outcome.result)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

//! Result types for handler invocations.

use std::time::Duration;

use serde_json::Value;

/// What one invocation produced: the handler's value, how long the call took
/// and how much it raised the process's peak resident memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome {
    pub result: Value,
    pub elapsed: Duration,
    pub peak_rss_delta: u64,
}

impl InvocationOutcome {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Whole milliseconds, truncated.
    pub fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Milliseconds rounded up to the next 100 ms billing bucket.
    pub fn billed_millis(&self) -> u64 {
        const BUCKET_NANOS: u128 = 100_000_000;
        let buckets = self.elapsed.as_nanos().div_ceil(BUCKET_NANOS);
        u64::try_from(buckets * 100).unwrap_or(u64::MAX)
    }
}

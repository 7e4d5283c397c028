//! Peak resident memory sampling.
//!
//! Peak RSS is a process-wide high-water mark: it never decreases. A delta
//! taken around one invocation is therefore the *additional* peak that
//! invocation pushed the process to, not its true footprint. In stream mode
//! an earlier record's peak hides growth from later records that stay below
//! it.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Source of the process's peak resident memory, in bytes.
pub trait PeakMemorySampler: Send + Sync {
    fn sample_peak_rss(&self) -> u64;
}

/// Reads the real process counters via `getrusage(RUSAGE_SELF)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSampler;

impl PeakMemorySampler for ProcessSampler {
    #[cfg(unix)]
    fn sample_peak_rss(&self) -> u64 {
        // SAFETY: getrusage only writes into the zeroed struct we hand it.
        let max_rss = unsafe {
            let mut usage: libc::rusage = std::mem::zeroed();
            if libc::getrusage(libc::RUSAGE_SELF, &mut usage) != 0 {
                return 0;
            }
            usage.ru_maxrss.max(0) as u64
        };

        // ru_maxrss is in bytes on Apple platforms, kilobytes elsewhere.
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            max_rss
        } else {
            max_rss.saturating_mul(1024)
        }
    }

    #[cfg(not(unix))]
    fn sample_peak_rss(&self) -> u64 {
        0
    }
}

/// Test double returning a fixed sequence of samples.
///
/// Once the script runs out the last sample repeats, matching the
/// non-decreasing behaviour of the real counter.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    samples: Mutex<VecDeque<u64>>,
    last: Mutex<u64>,
}

impl ScriptedSampler {
    pub fn new(samples: impl IntoIterator<Item = u64>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
            last: Mutex::new(0),
        }
    }
}

impl PeakMemorySampler for ScriptedSampler {
    fn sample_peak_rss(&self) -> u64 {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = samples.pop_front() {
            *last = next;
        }
        *last
    }
}

/// Peak growth between two samples; never negative.
pub fn peak_delta(before: u64, after: u64) -> u64 {
    after.saturating_sub(before)
}

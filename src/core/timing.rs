//! Execution timing and optional probes.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Monotonic timestamps around an operation's work payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionTiming {
    /// When the payload was entered.
    pub started_at: Option<Instant>,
    /// When the payload returned.
    pub finished_at: Option<Instant>,
}

impl ExecutionTiming {
    pub(crate) fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub(crate) fn stop(&mut self) {
        let now = Instant::now();
        // finished_at never precedes started_at.
        self.finished_at = Some(self.started_at.map_or(now, |start| now.max(start)));
    }

    /// Elapsed payload time, once both timestamps are set.
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }
}

/// Optional instrumentation sampled right before and after the payload.
///
/// Implementations wrap counters that may be unavailable on the host (for
/// example a per-thread CPU clock). A failed sample is `None` and shows up
/// as `null` in the status report.
pub trait ExecutionProbe: Send + Sync {
    /// Name reported alongside the reading.
    fn name(&self) -> &str;

    /// Current counter value, if the counter can be read.
    fn sample(&self) -> Option<u64>;
}

/// Difference between the two probe samples of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReading {
    /// Probe name.
    pub name: String,
    /// Units consumed by the payload; `None` when a sample was unavailable.
    pub units: Option<u64>,
}

impl ProbeReading {
    pub(crate) fn from_samples(name: &str, before: Option<u64>, after: Option<u64>) -> Self {
        let units = match (before, after) {
            (Some(before), Some(after)) => after.checked_sub(before),
            _ => None,
        };
        Self {
            name: name.to_string(),
            units,
        }
    }
}

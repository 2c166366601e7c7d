use std::time::{Duration, Instant};
use tracing::debug;

/// Counters for one session.
#[derive(Debug, Clone)]
pub struct SessionMetrics {
    started: Instant,
    /// Items described and persisted this session
    pub processed: usize,
    /// Items recorded as failed this session
    pub failed: usize,
    /// Items skipped because an earlier session completed them
    pub skipped: usize,
    /// Items whose result could not be written
    pub write_errors: usize,
    /// Captioning attempts beyond the first
    pub retries: u32,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            processed: 0,
            failed: 0,
            skipped: 0,
            write_errors: 0,
            retries: 0,
        }
    }
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempts(&mut self, attempts: u32) {
        self.retries += attempts.saturating_sub(1);
    }

    /// Items this session handled in any way.
    pub fn handled(&self) -> usize {
        self.processed + self.failed + self.skipped + self.write_errors
    }

    /// Failures of any kind, as reported in the final summary.
    pub fn errors(&self) -> usize {
        self.failed + self.write_errors
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Average seconds per attempted item, if any were attempted.
    pub fn seconds_per_item(&self) -> Option<f64> {
        let attempted = self.processed + self.failed + self.write_errors;
        if attempted == 0 {
            return None;
        }
        let avg = self.elapsed().as_secs_f64() / attempted as f64;
        debug!("Average {:.2}s per item over {} items", avg, attempted);
        Some(avg)
    }
}

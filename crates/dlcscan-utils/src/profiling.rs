//! Lightweight timing of discovery phases.

use std::time::{Duration, Instant};

/// Records how long a discovery phase took.
#[derive(Debug)]
pub struct SpanTimer {
    label: &'static str,
    start: Instant,
}

impl SpanTimer {
    /// Starts a new span timer.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finishes the span and logs its duration using [`tracing`].
    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(target: "profiling", label = self.label, elapsed = ?duration, "phase finished");
        duration
    }
}

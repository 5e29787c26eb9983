use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryEvent;

/// One value on the progress stream.
///
/// On the wire this is a single signed integer: negative values carry a new
/// total, non-negative values the running count of finished units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    Total(usize),
    Completed(usize),
}

impl Progress {
    pub fn to_signed(self) -> i64 {
        match self {
            Progress::Total(total) => -(total as i64),
            Progress::Completed(completed) => completed as i64,
        }
    }

    pub fn from_signed(value: i64) -> Self {
        if value < 0 {
            Progress::Total(value.unsigned_abs() as usize)
        } else {
            Progress::Completed(value as usize)
        }
    }
}

#[derive(Debug, Default)]
struct Counts {
    total: usize,
    completed: usize,
}

/// Publishes progress while units are discovered incrementally.
///
/// Updates are sent while the counters are locked, so the stream always shows
/// a growing total and a non-decreasing count.
#[derive(Debug)]
pub struct ProgressReporter {
    counts: Mutex<Counts>,
    sink: Sender<DiscoveryEvent>,
}

impl ProgressReporter {
    pub fn new(sink: Sender<DiscoveryEvent>) -> Self {
        Self {
            counts: Mutex::new(Counts::default()),
            sink,
        }
    }

    pub fn add_units(&self, units: usize) {
        if units == 0 {
            return;
        }
        let mut counts = self.counts.lock();
        counts.total += units;
        self.send(Progress::Total(counts.total));
    }

    pub fn complete_unit(&self) {
        let mut counts = self.counts.lock();
        counts.completed = (counts.completed + 1).min(counts.total);
        self.send(Progress::Completed(counts.completed));
    }

    /// Reports every known unit as done.
    pub fn finish(&self) {
        let mut counts = self.counts.lock();
        counts.completed = counts.total;
        self.send(Progress::Completed(counts.completed));
    }

    fn send(&self, progress: Progress) {
        // The receiver only goes away once the run is being torn down.
        let _ = self.sink.send(DiscoveryEvent::Progress(progress));
    }
}

/// Turns the progress stream back into a percentage for display.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    pub total: usize,
    pub completed: usize,
}

impl ProgressTracker {
    pub fn apply(&mut self, progress: Progress) -> u8 {
        match progress {
            Progress::Total(total) => self.total = total,
            Progress::Completed(completed) => self.completed = completed,
        }
        self.percent()
    }

    pub fn apply_signed(&mut self, value: i64) -> u8 {
        self.apply(Progress::from_signed(value))
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let percent = self.completed.saturating_mul(100) / self.total;
        percent.min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn signed_encoding_distinguishes_totals() {
        assert_eq!(Progress::Total(12).to_signed(), -12);
        assert_eq!(Progress::from_signed(-12), Progress::Total(12));
        assert_eq!(Progress::from_signed(5), Progress::Completed(5));
        assert_eq!(Progress::from_signed(0), Progress::Completed(0));
    }

    #[test]
    fn tracker_clamps_percentage() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.apply_signed(3), 0);
        assert_eq!(tracker.apply_signed(-4), 75);
        assert_eq!(tracker.apply_signed(8), 100);
        assert_eq!(tracker.apply_signed(-16), 50);
    }

    #[test]
    fn stream_stays_monotonic_under_contention() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let reporter = Arc::new(ProgressReporter::new(tx));
        thread::scope(|scope| {
            for _ in 0..8 {
                let reporter = Arc::clone(&reporter);
                scope.spawn(move || {
                    for _ in 0..50 {
                        reporter.add_units(1);
                        reporter.complete_unit();
                    }
                });
            }
        });
        reporter.finish();
        drop(reporter);

        let mut last_total = 0;
        let mut last_completed = 0;
        for event in rx.iter() {
            match event {
                DiscoveryEvent::Progress(Progress::Total(total)) => {
                    assert!(total > last_total);
                    last_total = total;
                }
                DiscoveryEvent::Progress(Progress::Completed(completed)) => {
                    assert!(completed >= last_completed);
                    assert!(completed <= last_total);
                    last_completed = completed;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!((last_completed, last_total), (400, 400));
    }
}

// Aggregate progress accounting and the live terminal reporter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use indicatif::ProgressBar;

/// Sink for engine progress events. `discovered` ticks when a reference is
/// first registered, `completed` when its file write finishes.
pub trait ProgressSink: Send + Sync {
    fn on_discovered(&self);
    fn on_completed(&self);
}

/// Monotonic counters; `completed <= discovered` at every observation point.
#[derive(Default)]
pub struct ProgressCounters {
    discovered: AtomicU64,
    completed: AtomicU64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ProgressCounters {
    fn on_discovered(&self) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
    }

    fn on_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Spinner-backed reporter for interactive runs.
pub struct SpinnerReporter {
    counters: ProgressCounters,
    bar: ProgressBar,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(100));
        let reporter = Self {
            counters: ProgressCounters::new(),
            bar,
        };
        reporter.update_message();
        reporter
    }

    fn update_message(&self) {
        self.bar.set_message(format!(
            "Processing: {} of {} derivatives saved ...",
            self.counters.completed(),
            self.counters.discovered()
        ));
    }

    /// Finish with the final counts.
    pub fn finish_success(&self) {
        self.bar.finish_with_message(format!(
            "Done: {} of {} derivatives saved ...",
            self.counters.completed(),
            self.counters.discovered()
        ));
    }

    /// Finish with the first unrecoverable error.
    pub fn finish_failure(&self, reason: &str) {
        self.bar.abandon_with_message(reason.to_string());
    }
}

impl Default for SpinnerReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SpinnerReporter {
    fn on_discovered(&self) {
        self.counters.on_discovered();
        self.update_message();
    }

    fn on_completed(&self) {
        self.counters.on_completed();
        self.update_message();
    }
}

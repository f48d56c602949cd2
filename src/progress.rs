//! Progress reporting for download and extraction operations

use tracing::debug;

/// Observer invoked inline from the transfer loop
///
/// Implementations must tolerate being called from whatever task runs the
/// fetch; both methods default to no-ops so an observer only implements
/// what it cares about.
pub trait ProgressObserver: Send + Sync {
    /// A new task (download, extraction) has started
    fn on_task_changed(&self, _label: &str) {}
    /// Completion percentage in `0.0..=100.0` for the current task
    fn on_progressed(&self, _percent: f64) {}
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {}

/// Observer that forwards events to the log
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_task_changed(&self, label: &str) {
        debug!(task = label, "task changed");
    }

    fn on_progressed(&self, percent: f64) {
        debug!(percent, "progressed");
    }
}

static NULL: NullProgress = NullProgress;

/// Substitute a no-op observer when the caller supplied none.
pub fn or_null(observer: Option<&dyn ProgressObserver>) -> &dyn ProgressObserver {
    observer.unwrap_or(&NULL)
}

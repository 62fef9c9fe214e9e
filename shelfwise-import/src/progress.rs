//! Import progress reporting.

/// Trait for receiving progress updates while batches are written.
pub trait ImportProgress {
    /// Called after each chunk has been executed.
    fn on_chunk(&self, current: usize, total: usize);

    /// Called when a phase starts (e.g., "Writing 240 operations").
    fn on_phase(&self, message: &str);

    /// Called when the run is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_chunk(&self, _current: usize, _total: usize) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_chunk(&self, current: usize, total: usize) {
        log::info!("  [chunk {}/{}]", current, total);
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}

//! Pipeline progress reporting.

/// Trait for receiving progress updates from a pipeline pass.
pub trait PipelineProgress {
    /// Called after each entry or id is processed.
    fn on_item(&self, current: usize, total: usize, label: &str);

    /// Called when a phase starts (e.g., "Resolving 120 entries").
    fn on_phase(&self, message: &str);

    /// Called when the pass is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl PipelineProgress for SilentProgress {
    fn on_item(&self, _current: usize, _total: usize, _label: &str) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl PipelineProgress for LogProgress {
    fn on_item(&self, current: usize, total: usize, label: &str) {
        if current.is_multiple_of(25) || current == total {
            log::info!("  [{}/{}] {}", current, total, label);
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}

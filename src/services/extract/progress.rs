use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receives one percentage in `[0, 100]` after every member.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// `processed / total` as a percentage; exactly 100 only when all are done.
pub fn percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    processed as f64 * 100.0 / total as f64
}

/// Stops an extraction between members. The member in flight finishes.
pub struct CancelFlag {
    is_cancelled: AtomicBool,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self {
            is_cancelled: AtomicBool::new(false),
        }
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelFlag {
    pub fn cancel(&self) {
        self.is_cancelled.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled.load(Ordering::SeqCst)
    }
}

/// Receives the output root of each completed brushset, e.g. to sort the
/// extracted textures into their final layout.
pub trait OutputReorganizer {
    fn reorganize(&self, output_root: &Path) -> Result<(), String>;
}

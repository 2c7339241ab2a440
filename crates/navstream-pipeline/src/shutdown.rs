use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide cancellation flag shared by the pipeline loops.
///
/// Set at most once; there is no way to clear it.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns true only for the call that set it.
    pub fn trigger(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

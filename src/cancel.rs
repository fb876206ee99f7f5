use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable signal a caller uses to withdraw a save that is being retried.
///
/// All clones share one flag. The coordinator checks it before every attempt,
/// and persist implementations receive it so they can abort an attempt that
/// is already running.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

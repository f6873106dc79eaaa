use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// "Has cancellation been requested" flag shared between the controller and one
/// job's polling loop.
///
/// Only the fact of a request matters, not how many there were. Each job gets a
/// fresh signal, so a new job always starts uncancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns `true` for the first request only.
    pub fn request(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

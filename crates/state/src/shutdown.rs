use std::sync::atomic::{AtomicBool, Ordering};

/// A one-directional shutdown signal visible to every activity (§3).
/// Transitions `false -> true` exactly once and is never cleared.
#[derive(Default)]
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    #[must_use]
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
}

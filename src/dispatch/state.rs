//! Session-scoped flags touched by dispatch side effects.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct SessionState {
    emergency_dial_in_progress: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_emergency_dial_in_progress(&self, in_progress: bool) {
        self.emergency_dial_in_progress
            .store(in_progress, Ordering::Release);
    }

    pub fn emergency_dial_in_progress(&self) -> bool {
        self.emergency_dial_in_progress.load(Ordering::Acquire)
    }

    /// Clear the emergency flag, returning whether it was set.
    ///
    /// Only one caller observes `true` for each time the flag is raised.
    pub fn take_emergency_dial(&self) -> bool {
        self.emergency_dial_in_progress
            .swap(false, Ordering::AcqRel)
    }
}

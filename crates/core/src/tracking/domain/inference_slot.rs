use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-occupancy flag for the one inference allowed in flight.
///
/// Clones share the same flag, so a caller can observe (or hold) the slot
/// owned by a scheduler.
#[derive(Clone, Debug, Default)]
pub struct InferenceSlot {
    busy: Arc<AtomicBool>,
}

impl InferenceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another holder is in flight.
    pub fn try_acquire(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the slot until dropped.
#[must_use = "the slot is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

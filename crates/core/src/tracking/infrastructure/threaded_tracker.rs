//! Runs a [`TrackingScheduler`] on its own thread.
//!
//! Layout: `caller --(frame + slot guard)--> worker --(unbounded)--> caller`
//!
//! `submit` takes the scheduler's in-flight slot before handing a frame over
//! and the worker releases it when that frame is done. A frame offered while
//! the slot is held is dropped rather than queued, and the caller never
//! blocks.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::shared::frame::Frame;
use crate::tracking::domain::inference_slot::{InFlight, InferenceSlot};
use crate::tracking::domain::tracking_result::TrackingResult;
use crate::tracking::domain::tracking_scheduler::TrackingScheduler;

/// Scheduler output tagged with the frame it came from.
#[derive(Clone, Debug)]
pub struct TrackedFrame {
    pub frame_index: usize,
    pub result: Option<TrackingResult>,
}

pub struct ThreadedTracker {
    slot: InferenceSlot,
    frame_tx: Option<Sender<(Frame, InFlight)>>,
    result_rx: Receiver<TrackedFrame>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedTracker {
    pub fn spawn(scheduler: TrackingScheduler) -> Self {
        let slot = scheduler.slot();
        // The guard travels with the frame, so at most one is ever queued.
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<(Frame, InFlight)>(1);
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<TrackedFrame>();
        let worker = spawn_worker(scheduler, frame_rx, result_tx);
        Self {
            slot,
            frame_tx: Some(frame_tx),
            result_rx,
            worker: Some(worker),
        }
    }

    /// Offer a frame to the worker. `false` when it was dropped because an
    /// inference is still in flight or the worker has stopped.
    pub fn submit(&self, frame: Frame) -> bool {
        let Some(tx) = &self.frame_tx else {
            return false;
        };
        let Some(in_flight) = self.slot.try_acquire() else {
            log::trace!("Tracker busy, dropped frame {}", frame.index());
            return false;
        };
        match tx.try_send((frame, in_flight)) {
            Ok(()) => true,
            Err(TrySendError::Full((frame, _))) => {
                log::trace!("Tracker queue full, dropped frame {}", frame.index());
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Whether a submitted frame is still being tracked.
    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Completed results since the last poll, oldest first.
    pub fn poll(&self) -> Vec<TrackedFrame> {
        self.result_rx.try_iter().collect()
    }

    /// Stop accepting frames and wait for the in-flight one to finish.
    /// Results it produces remain available through [`poll`](Self::poll).
    pub fn shutdown(&mut self) {
        self.frame_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Tracking worker panicked");
            }
        }
    }
}

impl Drop for ThreadedTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(
    mut scheduler: TrackingScheduler,
    frame_rx: Receiver<(Frame, InFlight)>,
    result_tx: Sender<TrackedFrame>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (frame, in_flight) in frame_rx {
            let result = scheduler.process_in_flight(&frame, in_flight);
            let tracked = TrackedFrame {
                frame_index: frame.index(),
                result,
            };
            if result_tx.send(tracked).is_err() {
                break;
            }
        }
        log::debug!("Tracking worker stopped");
    })
}

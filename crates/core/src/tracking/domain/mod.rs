pub mod clock;
pub mod inference_slot;
pub mod tracking_result;
pub mod tracking_scheduler;

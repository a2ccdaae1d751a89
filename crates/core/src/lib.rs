//! Real-time single-face tracking.
//!
//! Turns raw detector and landmark network output into a face box, 68
//! landmark points, a head orientation and five expression weights, and
//! schedules detection vs. landmark work across frames.

pub mod detection;
pub mod estimation;
pub mod landmarks;
pub mod rig;
pub mod shared;
pub mod tracking;
pub mod video;

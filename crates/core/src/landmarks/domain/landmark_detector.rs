use crate::landmarks::domain::face_landmarks::FaceLandmarks;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;

/// Locates 68 landmarks inside a face box.
pub trait LandmarkDetector: Send {
    /// `Ok(None)` when the box does not overlap the frame.
    fn detect_landmarks(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<Option<FaceLandmarks>, TrackingError>;
}

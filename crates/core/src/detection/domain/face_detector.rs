use crate::shared::bounding_box::ScoredBox;
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;

/// Domain interface for full-frame face search.
///
/// Candidates come back best-first; an empty vector means no face.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<ScoredBox>, TrackingError>;
}

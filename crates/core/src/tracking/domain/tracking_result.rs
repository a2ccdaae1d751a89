use serde::Serialize;

use crate::estimation::domain::expression_estimator::ExpressionWeights;
use crate::estimation::domain::orientation::Orientation;
use crate::landmarks::domain::face_landmarks::FaceLandmarks;
use crate::shared::bounding_box::ScoredBox;

/// Everything derived from one successfully processed frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackingResult {
    pub face: ScoredBox,
    pub landmarks: FaceLandmarks,
    pub orientation: Orientation,
    pub expressions: ExpressionWeights,
}

/// Render-side fallback: the most recent successful result.
///
/// Frames without a fresh result keep showing the last one; before any
/// result the output is neutral.
#[derive(Clone, Debug, Default)]
pub struct LastKnownOutput {
    latest: Option<TrackingResult>,
}

impl LastKnownOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `result` if present; `None` leaves the previous output in place.
    pub fn record(&mut self, result: Option<TrackingResult>) {
        if let Some(result) = result {
            self.latest = Some(result);
        }
    }

    pub fn latest(&self) -> Option<&TrackingResult> {
        self.latest.as_ref()
    }

    pub fn face(&self) -> Option<&ScoredBox> {
        self.latest.as_ref().map(|r| &r.face)
    }

    pub fn orientation(&self) -> Orientation {
        self.latest
            .as_ref()
            .map(|r| r.orientation)
            .unwrap_or_default()
    }

    pub fn expressions(&self) -> ExpressionWeights {
        self.latest
            .as_ref()
            .map(|r| r.expressions)
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}

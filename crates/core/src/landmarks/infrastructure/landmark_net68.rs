//! 68-point landmark network over a face crop.

use crate::landmarks::domain::back_projection::back_project;
use crate::landmarks::domain::face_landmarks::FaceLandmarks;
use crate::landmarks::domain::landmark_detector::LandmarkDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{LANDMARK_DIVISOR, LANDMARK_INPUT_SIZE, LANDMARK_MEAN_RGB};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::image_tensor::{letterbox_tile, PadPlacement, PixelRect, TileSpec};
use crate::shared::inference_model::InferenceModel;

pub struct LandmarkNet68 {
    model: Box<dyn InferenceModel>,
    tile: TileSpec,
}

impl LandmarkNet68 {
    pub fn new(model: Box<dyn InferenceModel>) -> Self {
        Self {
            model,
            tile: TileSpec {
                size: LANDMARK_INPUT_SIZE,
                mean: LANDMARK_MEAN_RGB,
                divisor: LANDMARK_DIVISOR,
            },
        }
    }
}

impl LandmarkDetector for LandmarkNet68 {
    fn detect_landmarks(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<Option<FaceLandmarks>, TrackingError> {
        let Some(rect) = crop_rect(face, frame.width(), frame.height()) else {
            return Ok(None);
        };

        let input = letterbox_tile(frame, rect, PadPlacement::Centered, &self.tile)?;
        let output = self.model.infer(input)?;
        let raw: Vec<f32> = output.iter().copied().collect();

        back_project(
            &raw,
            face,
            rect.width as f64,
            rect.height as f64,
            LANDMARK_INPUT_SIZE as f64,
        )
        .map(Some)
    }
}

/// Integer crop of `face` clamped to the frame, `None` when nothing is left.
fn crop_rect(face: &BoundingBox, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
    let x = face.x.floor().max(0.0) as i64;
    let y = face.y.floor().max(0.0) as i64;
    let width = (face.width.floor() as i64).min(frame_width as i64 - x);
    let height = (face.height.floor() as i64).min(frame_height as i64 - y);
    if width <= 0 || height <= 0 {
        return None;
    }
    Some(PixelRect {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
    })
}

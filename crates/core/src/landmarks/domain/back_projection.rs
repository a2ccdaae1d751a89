//! Maps normalized landmark network output back to image pixels.
//!
//! The crop is centered on a `max(w, h)` square and scaled to the network's
//! input size, so each raw coordinate is undone in reverse: scale up, remove
//! the pad, undo the resize, then shift by the crop origin.

use crate::landmarks::domain::face_landmarks::{FaceLandmarks, Point};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::LANDMARK_COUNT;
use crate::shared::error::TrackingError;

/// Inverse of the centered letterbox applied to one crop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropLetterbox {
    input_size: f64,
    crop_width: f64,
    crop_height: f64,
    scale: f64,
    pad_x: f64,
    pad_y: f64,
}

impl CropLetterbox {
    pub fn new(crop_width: f64, crop_height: f64, input_size: f64) -> Self {
        let diff = (crop_width - crop_height).abs() / 2.0;
        Self {
            input_size,
            crop_width,
            crop_height,
            scale: input_size / crop_width.max(crop_height),
            pad_x: if crop_width < crop_height { diff } else { 0.0 },
            pad_y: if crop_height < crop_width { diff } else { 0.0 },
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw network coordinates in `[0, 1]` to pixels relative to `origin`.
    pub fn to_image(&self, raw_x: f64, raw_y: f64, origin_x: f64, origin_y: f64) -> Point {
        let scaled_w = self.crop_width * self.scale;
        let scaled_h = self.crop_height * self.scale;
        Point::new(
            (raw_x * self.input_size - self.pad_x * self.scale) * (self.crop_width / scaled_w)
                + origin_x,
            (raw_y * self.input_size - self.pad_y * self.scale) * (self.crop_height / scaled_h)
                + origin_y,
        )
    }
}

/// Back-project 136 raw floats (`x0, y0, x1, y1, ...`) to 68 image points.
pub fn back_project(
    raw: &[f32],
    face: &BoundingBox,
    crop_width: f64,
    crop_height: f64,
    input_size: f64,
) -> Result<FaceLandmarks, TrackingError> {
    if raw.len() != LANDMARK_COUNT * 2 {
        return Err(TrackingError::MalformedOutput {
            expected: LANDMARK_COUNT * 2,
            actual: raw.len(),
        });
    }
    let letterbox = CropLetterbox::new(crop_width, crop_height, input_size);
    let points = raw
        .chunks_exact(2)
        .map(|xy| letterbox.to_image(xy[0] as f64, xy[1] as f64, face.x, face.y))
        .collect();
    FaceLandmarks::new(points)
}

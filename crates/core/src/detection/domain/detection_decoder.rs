//! Decodes the detector's anchor grid into scored image-space boxes.
//!
//! The network sees the frame padded on the right/bottom to a square, so
//! grid-relative coordinates are stretched back by `max_dim / dim` on each
//! axis before scaling to pixels.

use crate::shared::bounding_box::{BoundingBox, ScoredBox};
use crate::shared::constants::BOX_ENCODING_LEN;
use crate::shared::error::TrackingError;
use crate::shared::geometry::{non_max_suppression, sigmoid};

#[derive(Clone, Debug)]
pub struct DetectionDecoder {
    /// Prior `(width, height)` per anchor slot, in grid cells.
    anchors: Vec<(f64, f64)>,
    score_threshold: f64,
    iou_threshold: f64,
}

impl DetectionDecoder {
    pub fn new(anchors: &[(f64, f64)], score_threshold: f64, iou_threshold: f64) -> Self {
        Self {
            anchors: anchors.to_vec(),
            score_threshold,
            iou_threshold,
        }
    }

    pub fn num_anchors(&self) -> usize {
        self.anchors.len()
    }

    /// Candidates after suppression, best score first.
    pub fn decode(
        &self,
        data: &[f32],
        num_cells: usize,
        image_width: u32,
        image_height: u32,
    ) -> Result<Vec<ScoredBox>, TrackingError> {
        let candidates = self.candidates(data, num_cells, image_width, image_height)?;
        Ok(non_max_suppression(&candidates, self.iou_threshold))
    }

    /// Every anchor prediction above the score threshold, clipped to the
    /// image, before suppression.
    ///
    /// `data` is laid out as `[row][col][anchor][tx, ty, tw, th, score]`.
    pub fn candidates(
        &self,
        data: &[f32],
        num_cells: usize,
        image_width: u32,
        image_height: u32,
    ) -> Result<Vec<ScoredBox>, TrackingError> {
        let num_anchors = self.anchors.len();
        let expected = num_cells * num_cells * num_anchors * BOX_ENCODING_LEN;
        if data.len() != expected {
            return Err(TrackingError::MalformedOutput {
                expected,
                actual: data.len(),
            });
        }
        if image_width == 0 || image_height == 0 {
            return Ok(Vec::new());
        }

        let orig_w = image_width as f64;
        let orig_h = image_height as f64;
        let max_dim = orig_w.max(orig_h);
        let corr_x = max_dim / orig_w;
        let corr_y = max_dim / orig_h;
        let cells = num_cells as f64;

        let mut boxes = Vec::new();
        for row in 0..num_cells {
            for col in 0..num_cells {
                for (a, &(prior_w, prior_h)) in self.anchors.iter().enumerate() {
                    let offset = ((row * num_cells + col) * num_anchors + a) * BOX_ENCODING_LEN;
                    let cell = &data[offset..offset + BOX_ENCODING_LEN];

                    let score = sigmoid(cell[4] as f64);
                    if score.is_nan() || score < self.score_threshold {
                        continue;
                    }

                    let ct_x = ((col as f64 + sigmoid(cell[0] as f64)) / cells) * corr_x;
                    let ct_y = ((row as f64 + sigmoid(cell[1] as f64)) / cells) * corr_y;
                    let w = ((cell[2] as f64).exp() * prior_w / cells) * corr_x;
                    let h = ((cell[3] as f64).exp() * prior_h / cells) * corr_y;

                    let x = (ct_x - w / 2.0) * orig_w;
                    let y = (ct_y - h / 2.0) * orig_h;
                    let width = w * orig_w;
                    let height = h * orig_h;

                    if let Some(bbox) = clip_to_image(x, y, width, height, orig_w, orig_h) {
                        boxes.push(ScoredBox::new(bbox, score));
                    }
                }
            }
        }
        Ok(boxes)
    }
}

/// `None` for empty boxes or boxes entirely outside the image.
fn clip_to_image(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    image_w: f64,
    image_h: f64,
) -> Option<BoundingBox> {
    let visible = width > 0.0
        && height > 0.0
        && x + width > 0.0
        && y + height > 0.0
        && x < image_w
        && y < image_h;
    if !visible {
        return None;
    }
    let cx = x.max(0.0);
    let cy = y.max(0.0);
    Some(BoundingBox::new(
        cx,
        cy,
        width.min(image_w - cx),
        height.min(image_h - cy),
    ))
}

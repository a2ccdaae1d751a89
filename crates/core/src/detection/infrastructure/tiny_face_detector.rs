//! Full-frame face detector over an anchor-grid network.
//!
//! Handles pad-to-square preprocessing, inference through an
//! [`InferenceModel`], grid decoding and NMS.

use ndarray::ArrayD;

use crate::detection::domain::detection_decoder::DetectionDecoder;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::ScoredBox;
use crate::shared::config::TrackerConfig;
use crate::shared::constants::{
    BOX_ENCODING_LEN, DETECTOR_ANCHORS, DETECTOR_DIVISOR, DETECTOR_MEAN_RGB,
};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::image_tensor::{letterbox_tile, PadPlacement, PixelRect, TileSpec};
use crate::shared::inference_model::InferenceModel;

pub struct TinyFaceDetector {
    model: Box<dyn InferenceModel>,
    decoder: DetectionDecoder,
    tile: TileSpec,
}

impl TinyFaceDetector {
    pub fn new(model: Box<dyn InferenceModel>, config: &TrackerConfig) -> Self {
        Self {
            model,
            decoder: DetectionDecoder::new(
                &DETECTOR_ANCHORS,
                config.score_threshold,
                config.nms_iou_threshold,
            ),
            tile: TileSpec {
                size: config.detector_input_size,
                mean: DETECTOR_MEAN_RGB,
                divisor: DETECTOR_DIVISOR,
            },
        }
    }
}

impl FaceDetector for TinyFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<ScoredBox>, TrackingError> {
        // 1. Preprocess: pad right/bottom to square, resize, normalize
        let input = letterbox_tile(
            frame,
            PixelRect::full_frame(frame),
            PadPlacement::TopLeft,
            &self.tile,
        )?;

        // 2. Inference
        let output = self.model.infer(input)?;

        // 3. Decode + NMS
        let (num_cells, grid) = flatten_grid(&output, self.decoder.num_anchors())?;
        self.decoder
            .decode(&grid, num_cells, frame.width(), frame.height())
    }
}

/// Validate a `[1, cells, cells, anchors * 5]` output and flatten it in
/// row-major order.
fn flatten_grid(
    output: &ArrayD<f32>,
    num_anchors: usize,
) -> Result<(usize, Vec<f32>), TrackingError> {
    let shape = output.shape();
    let well_formed = shape.len() == 4
        && shape[0] == 1
        && shape[1] == shape[2]
        && shape[3] == num_anchors * BOX_ENCODING_LEN;
    if !well_formed {
        return Err(TrackingError::UnexpectedShape(shape.to_vec()));
    }
    Ok((shape[1], output.iter().copied().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use ndarray::{Array4, IxDyn};

    struct FakeModel {
        output: ArrayD<f32>,
        seen_shapes: Arc<Mutex<Vec<Vec<usize>>>>,
    }

    impl InferenceModel for FakeModel {
        fn infer(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, TrackingError> {
            self.seen_shapes.lock().unwrap().push(input.shape().to_vec());
            Ok(self.output.clone())
        }
    }

    struct FailingModel;

    impl InferenceModel for FailingModel {
        fn infer(&mut self, _input: Array4<f32>) -> Result<ArrayD<f32>, TrackingError> {
            Err(TrackingError::Backend("session crashed".into()))
        }
    }

    fn grid_output(num_cells: usize, hot: Option<(usize, usize, usize)>) -> ArrayD<f32> {
        let depth = DETECTOR_ANCHORS.len() * 5;
        let mut out = ArrayD::<f32>::zeros(IxDyn(&[1, num_cells, num_cells, depth]));
        for row in 0..num_cells {
            for col in 0..num_cells {
                for a in 0..DETECTOR_ANCHORS.len() {
                    out[IxDyn(&[0, row, col, a * 5 + 4])] = -10.0;
                }
            }
        }
        if let Some((row, col, a)) = hot {
            out[IxDyn(&[0, row, col, a * 5 + 4])] = 8.0;
        }
        out
    }

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![90u8; (width * height * 3) as usize], width, height, 3, 0)
    }

    #[test]
    fn test_feeds_square_tile_of_configured_size() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let model = FakeModel {
            output: grid_output(5, None),
            seen_shapes: seen.clone(),
        };
        let mut detector = TinyFaceDetector::new(Box::new(model), &TrackerConfig::default());

        detector.detect(&frame(64, 48)).unwrap();

        assert_eq!(seen.lock().unwrap()[0], vec![1, 160, 160, 3]);
    }

    #[test]
    fn test_detects_hot_anchor_in_frame_coordinates() {
        let model = FakeModel {
            output: grid_output(5, Some((2, 2, 0))),
            seen_shapes: Arc::new(Mutex::new(Vec::new())),
        };
        let mut detector = TinyFaceDetector::new(Box::new(model), &TrackerConfig::default());

        let faces = detector.detect(&frame(100, 100)).unwrap();

        assert_eq!(faces.len(), 1);
        let (cx, cy) = faces[0].bbox.center();
        assert!((cx - 50.0).abs() < 1e-6);
        assert!((cy - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_face_returns_empty() {
        let model = FakeModel {
            output: grid_output(5, None),
            seen_shapes: Arc::new(Mutex::new(Vec::new())),
        };
        let mut detector = TinyFaceDetector::new(Box::new(model), &TrackerConfig::default());

        assert!(detector.detect(&frame(32, 32)).unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_shape_is_error() {
        let model = FakeModel {
            output: ArrayD::<f32>::zeros(IxDyn(&[1, 5, 4, 25])),
            seen_shapes: Arc::new(Mutex::new(Vec::new())),
        };
        let mut detector = TinyFaceDetector::new(Box::new(model), &TrackerConfig::default());

        let result = detector.detect(&frame(32, 32));

        assert!(matches!(result, Err(TrackingError::UnexpectedShape(_))));
    }

    #[test]
    fn test_backend_failure_propagates() {
        let mut detector = TinyFaceDetector::new(Box::new(FailingModel), &TrackerConfig::default());
        assert!(matches!(
            detector.detect(&frame(32, 32)),
            Err(TrackingError::Backend(_))
        ));
    }

    #[test]
    fn test_empty_frame_rejected_before_inference() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let model = FakeModel {
            output: grid_output(5, None),
            seen_shapes: seen.clone(),
        };
        let mut detector = TinyFaceDetector::new(Box::new(model), &TrackerConfig::default());

        let result = detector.detect(&Frame::new(Vec::new(), 0, 0, 3, 0));

        assert!(matches!(result, Err(TrackingError::InvalidFrame(_))));
        assert!(seen.lock().unwrap().is_empty());
    }
}

//! Blendshape-style expression weights from 68 landmarks.
//!
//! Each weight starts as a geometric ratio normalized by the inter-eye
//! distance, is mapped into `[0, 1]` through its own self-calibrating
//! [`RangeTracker`], then smoothed over time. All of that state lives in one
//! [`ExpressionEstimator`] per tracking session.

use serde::{Deserialize, Serialize};

use crate::estimation::domain::ema_smoother::EmaSmoother;
use crate::estimation::domain::range_tracker::RangeTracker;
use crate::landmarks::domain::face_landmarks::{FaceLandmarks, FaceRegion, Point};
use crate::shared::constants::EXPRESSION_SMOOTHING;

const RIGHT_EYE_OUTER: usize = 36;
const RIGHT_EYE_INNER: usize = 39;
const LEFT_EYE_INNER: usize = 42;
const LEFT_EYE_OUTER: usize = 45;
const MOUTH_LEFT: usize = 48;
const MOUTH_RIGHT: usize = 54;
const INNER_LIP_TOP: usize = 62;
const INNER_LIP_BOTTOM: usize = 66;

/// Faces smaller than this (inter-eye distance in pixels) are ignored.
const MIN_INTER_EYE: f64 = 1.0;
const MIN_EYE_SPAN: f64 = 0.001;

const SEED_EAR: (f64, f64) = (0.05, 0.35);
const SEED_MOUTH_GAP: (f64, f64) = (0.0, 0.5);
const SEED_MOUTH_WIDTH: (f64, f64) = (0.8, 1.2);
const SEED_BROW: (f64, f64) = (0.2, 0.6);

/// Expression weights, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionWeights {
    pub eye_blink_left: f64,
    pub eye_blink_right: f64,
    pub mouth_open: f64,
    pub mouth_smile: f64,
    pub brow_raise: f64,
}

impl ExpressionWeights {
    fn from_array(v: [f64; 5]) -> Self {
        Self {
            eye_blink_left: v[0],
            eye_blink_right: v[1],
            mouth_open: v[2],
            mouth_smile: v[3],
            brow_raise: v[4],
        }
    }
}

/// Uncalibrated per-frame measurements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSignals {
    pub ear_left: f64,
    pub ear_right: f64,
    pub mouth_gap: f64,
    pub mouth_width: f64,
    pub brow_distance: f64,
}

impl RawSignals {
    /// `None` when the face is too small to measure.
    pub fn measure(landmarks: &FaceLandmarks) -> Option<Self> {
        let p = |i: usize| landmarks.point(i);
        let inter_eye = p(RIGHT_EYE_OUTER).distance(&p(LEFT_EYE_OUTER));
        if inter_eye < MIN_INTER_EYE {
            return None;
        }

        let left_brow = mean_y(landmarks.region(FaceRegion::LeftEyebrow));
        let right_brow = mean_y(landmarks.region(FaceRegion::RightEyebrow));
        let left_eye = (p(LEFT_EYE_INNER).y + p(LEFT_EYE_OUTER).y) / 2.0;
        let right_eye = (p(RIGHT_EYE_OUTER).y + p(RIGHT_EYE_INNER).y) / 2.0;
        let brow_distance =
            ((left_eye - left_brow) / inter_eye + (right_eye - right_brow) / inter_eye) / 2.0;

        Some(Self {
            ear_left: eye_aspect_ratio(landmarks.region(FaceRegion::LeftEye)),
            ear_right: eye_aspect_ratio(landmarks.region(FaceRegion::RightEye)),
            mouth_gap: p(INNER_LIP_TOP).distance(&p(INNER_LIP_BOTTOM)) / inter_eye,
            mouth_width: p(MOUTH_LEFT).distance(&p(MOUTH_RIGHT)) / inter_eye,
            brow_distance,
        })
    }
}

/// `(|p2-p6| + |p3-p5|) / (2 |p1-p4|)` over an eye's six points.
pub fn eye_aspect_ratio(eye: &[Point]) -> f64 {
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal < MIN_EYE_SPAN {
        return 0.0;
    }
    (eye[1].distance(&eye[5]) + eye[2].distance(&eye[4])) / (2.0 * horizontal)
}

fn mean_y(points: &[Point]) -> f64 {
    points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64
}

pub struct ExpressionEstimator {
    ear_left: RangeTracker,
    ear_right: RangeTracker,
    mouth_gap: RangeTracker,
    mouth_width: RangeTracker,
    brow_distance: RangeTracker,
    smoother: EmaSmoother<5>,
}

impl ExpressionEstimator {
    pub fn new() -> Self {
        Self {
            ear_left: RangeTracker::new(SEED_EAR.0, SEED_EAR.1),
            ear_right: RangeTracker::new(SEED_EAR.0, SEED_EAR.1),
            mouth_gap: RangeTracker::new(SEED_MOUTH_GAP.0, SEED_MOUTH_GAP.1),
            mouth_width: RangeTracker::new(SEED_MOUTH_WIDTH.0, SEED_MOUTH_WIDTH.1),
            brow_distance: RangeTracker::new(SEED_BROW.0, SEED_BROW.1),
            smoother: EmaSmoother::new(EXPRESSION_SMOOTHING),
        }
    }

    /// Calibrate on this frame and return smoothed weights.
    ///
    /// A face too small to measure leaves all state untouched and yields the
    /// previous output (zeros before the first measurement).
    pub fn extract(&mut self, landmarks: &FaceLandmarks) -> ExpressionWeights {
        let Some(raw) = RawSignals::measure(landmarks) else {
            return self.current();
        };

        self.ear_left.update(raw.ear_left);
        self.ear_right.update(raw.ear_right);
        self.mouth_gap.update(raw.mouth_gap);
        self.mouth_width.update(raw.mouth_width);
        self.brow_distance.update(raw.brow_distance);

        let mapped = [
            self.ear_left.map(raw.ear_left, true),
            self.ear_right.map(raw.ear_right, true),
            self.mouth_gap.map(raw.mouth_gap, false),
            self.mouth_width.map(raw.mouth_width, false),
            self.brow_distance.map(raw.brow_distance, false),
        ];
        ExpressionWeights::from_array(self.smoother.smooth(mapped))
    }

    /// Last smoothed output, zeros before the first measurement.
    pub fn current(&self) -> ExpressionWeights {
        self.smoother
            .current()
            .map(ExpressionWeights::from_array)
            .unwrap_or_default()
    }

    /// Start a new session: drop smoothing history and re-center every range
    /// on its next observation. Learned bounds are kept.
    pub fn reset(&mut self) {
        self.smoother.reset();
        for range in self.ranges_mut() {
            range.forget();
        }
        log::info!("Expression calibration reset");
    }

    /// Ranges in weight order: blink left/right, mouth open, smile, brow.
    pub fn ranges(&self) -> [&RangeTracker; 5] {
        [
            &self.ear_left,
            &self.ear_right,
            &self.mouth_gap,
            &self.mouth_width,
            &self.brow_distance,
        ]
    }

    fn ranges_mut(&mut self) -> [&mut RangeTracker; 5] {
        [
            &mut self.ear_left,
            &mut self.ear_right,
            &mut self.mouth_gap,
            &mut self.mouth_width,
            &mut self.brow_distance,
        ]
    }
}

impl Default for ExpressionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

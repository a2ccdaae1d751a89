//! Head orientation from three anchor landmarks.
//!
//! A coarse heuristic rather than a pose solve: yaw and pitch come from the
//! nose tip's offset against the eye midpoint, roll from the eye line.

use serde::{Deserialize, Serialize};

use crate::landmarks::domain::face_landmarks::{FaceLandmarks, Point};
use crate::shared::constants::{LANDMARK_COUNT, ORIENTATION_GAIN};

const RIGHT_EYE_OUTER: usize = 36;
const LEFT_EYE_OUTER: usize = 45;
const NOSE_TIP: usize = 30;

/// Head rotation in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn from_landmarks(landmarks: &FaceLandmarks) -> Self {
        Self::estimate(landmarks.points())
    }

    /// Neutral for fewer than 68 points or coincident eye corners.
    pub fn estimate(points: &[Point]) -> Self {
        if points.len() < LANDMARK_COUNT {
            return Self::default();
        }
        let first = points[RIGHT_EYE_OUTER];
        let second = points[LEFT_EYE_OUTER];
        let nose = points[NOSE_TIP];

        let eye_dist = first.distance(&second);
        if eye_dist == 0.0 {
            return Self::default();
        }
        let mid = first.midpoint(&second);

        Self {
            yaw: (mid.x - nose.x) / eye_dist * ORIENTATION_GAIN,
            pitch: (nose.y - mid.y) / eye_dist * ORIENTATION_GAIN,
            roll: (second.y - first.y).atan2(second.x - first.x).to_degrees(),
        }
    }
}

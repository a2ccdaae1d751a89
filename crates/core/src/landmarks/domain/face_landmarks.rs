//! 68-point face landmarks in original-image pixel coordinates.
//!
//! Index layout follows the iBUG 300-W convention; "left"/"right" are from
//! the subject's point of view.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::LANDMARK_COUNT;
use crate::shared::error::TrackingError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceRegion {
    Jaw,
    RightEyebrow,
    LeftEyebrow,
    NoseBridge,
    NoseTip,
    RightEye,
    LeftEye,
    OuterLips,
    InnerLips,
}

impl FaceRegion {
    pub const ALL: [FaceRegion; 9] = [
        FaceRegion::Jaw,
        FaceRegion::RightEyebrow,
        FaceRegion::LeftEyebrow,
        FaceRegion::NoseBridge,
        FaceRegion::NoseTip,
        FaceRegion::RightEye,
        FaceRegion::LeftEye,
        FaceRegion::OuterLips,
        FaceRegion::InnerLips,
    ];

    pub fn indices(self) -> Range<usize> {
        match self {
            FaceRegion::Jaw => 0..17,
            FaceRegion::RightEyebrow => 17..22,
            FaceRegion::LeftEyebrow => 22..27,
            FaceRegion::NoseBridge => 27..31,
            FaceRegion::NoseTip => 31..36,
            FaceRegion::RightEye => 36..42,
            FaceRegion::LeftEye => 42..48,
            FaceRegion::OuterLips => 48..60,
            FaceRegion::InnerLips => 60..68,
        }
    }

    /// Whether a renderer should close the outline of this region.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            FaceRegion::RightEye | FaceRegion::LeftEye | FaceRegion::OuterLips | FaceRegion::InnerLips
        )
    }
}

/// Exactly 68 points, immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, TrackingError> {
        if points.len() != LANDMARK_COUNT {
            return Err(TrackingError::MalformedOutput {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn region(&self, region: FaceRegion) -> &[Point] {
        &self.points[region.indices()]
    }

    /// Tight box around all 68 points.
    pub fn bounding_box(&self) -> BoundingBox {
        let (mut x1, mut y1) = (f64::INFINITY, f64::INFINITY);
        let (mut x2, mut y2) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        BoundingBox::new(x1, y1, x2 - x1, y2 - y1)
    }
}

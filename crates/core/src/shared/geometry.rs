//! Pure box math shared by the detection decoder and its tests.
//!
//! Provides the logistic activation used on raw network logits, box IoU,
//! and greedy non-maximum suppression.

use std::cmp::Ordering;

use super::bounding_box::{BoundingBox, ScoredBox};

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Intersection over union of two boxes.
///
/// Zero when the boxes are disjoint, only share an edge, or either one has
/// no area.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter <= 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}

/// Greedy NMS: take the best remaining box, drop everything overlapping it
/// by more than `iou_threshold`, repeat.
///
/// The input is left untouched. Equal scores keep their input order.
pub fn non_max_suppression(boxes: &[ScoredBox], iou_threshold: f64) -> Vec<ScoredBox> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[b]
            .score
            .partial_cmp(&boxes[a].score)
            .unwrap_or(Ordering::Equal)
    });

    let mut suppressed = vec![false; boxes.len()];
    let mut keep = Vec::new();

    for (k, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(boxes[i]);
        for &j in &order[k + 1..] {
            if !suppressed[j] && iou(&boxes[i].bbox, &boxes[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    keep
}

//! Per-frame control loop for one tracking session.
//!
//! Full-frame detection is expensive, so it only runs when there is no cached
//! face box or the cached one is older than the redetection interval. Every
//! accepted frame runs the landmark network on the cached box and derives
//! orientation and expression weights from the result.

use std::time::{Duration, Instant};

use crate::detection::domain::face_detector::FaceDetector;
use crate::estimation::domain::expression_estimator::ExpressionEstimator;
use crate::estimation::domain::orientation::Orientation;
use crate::landmarks::domain::landmark_detector::LandmarkDetector;
use crate::shared::bounding_box::ScoredBox;
use crate::shared::config::TrackerConfig;
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::tracking::domain::clock::{Clock, SystemClock};
use crate::tracking::domain::inference_slot::{InFlight, InferenceSlot};
use crate::tracking::domain::tracking_result::TrackingResult;

pub struct TrackingScheduler {
    detector: Box<dyn FaceDetector>,
    landmarker: Box<dyn LandmarkDetector>,
    expressions: ExpressionEstimator,
    clock: Box<dyn Clock>,
    redetect_interval: Duration,
    slot: InferenceSlot,
    cached_face: Option<ScoredBox>,
    last_detection: Option<Instant>,
}

impl TrackingScheduler {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        landmarker: Box<dyn LandmarkDetector>,
        config: &TrackerConfig,
    ) -> Self {
        Self::with_clock(detector, landmarker, config, Box::new(SystemClock))
    }

    pub fn with_clock(
        detector: Box<dyn FaceDetector>,
        landmarker: Box<dyn LandmarkDetector>,
        config: &TrackerConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            detector,
            landmarker,
            expressions: ExpressionEstimator::new(),
            clock,
            redetect_interval: config.redetect_interval(),
            slot: InferenceSlot::new(),
            cached_face: None,
            last_detection: None,
        }
    }

    /// Track one frame.
    ///
    /// Returns `None` when another inference is in flight, when no face is
    /// found, or when inference fails. Failures are logged and leave the
    /// cached box and expression calibration as they were.
    pub fn process(&mut self, frame: &Frame) -> Option<TrackingResult> {
        let Some(in_flight) = self.slot.try_acquire() else {
            log::debug!("Inference in flight, dropping frame {}", frame.index());
            return None;
        };
        self.process_in_flight(frame, in_flight)
    }

    /// Track one frame under a guard the caller already took from
    /// [`slot`](Self::slot). The slot is released on return.
    pub fn process_in_flight(
        &mut self,
        frame: &Frame,
        _in_flight: InFlight,
    ) -> Option<TrackingResult> {
        match self.run(frame) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Tracking failed on frame {}: {e}", frame.index());
                None
            }
        }
    }

    fn run(&mut self, frame: &Frame) -> Result<Option<TrackingResult>, TrackingError> {
        let now = self.clock.now();

        let fresh = if self.detection_due(now) {
            let started = Instant::now();
            let faces = self.detector.detect(frame)?;
            log::debug!(
                "Detection on frame {} found {} face(s) in {:.1?}",
                frame.index(),
                faces.len(),
                started.elapsed()
            );
            let Some(&best) = faces.first() else {
                self.cached_face = None;
                self.last_detection = Some(now);
                return Ok(None);
            };
            Some(best)
        } else {
            None
        };
        let Some(target) = fresh.or(self.cached_face) else {
            return Ok(None);
        };

        let started = Instant::now();
        let landmarks = self.landmarker.detect_landmarks(frame, &target.bbox)?;
        log::debug!(
            "Landmarks on frame {} in {:.1?}",
            frame.index(),
            started.elapsed()
        );

        // Commit only once every fallible step has succeeded.
        if fresh.is_some() {
            self.cached_face = fresh;
            self.last_detection = Some(now);
        }
        let Some(landmarks) = landmarks else {
            return Ok(None);
        };

        let orientation = Orientation::from_landmarks(&landmarks);
        let expressions = self.expressions.extract(&landmarks);
        Ok(Some(TrackingResult {
            face: target,
            landmarks,
            orientation,
            expressions,
        }))
    }

    fn detection_due(&self, now: Instant) -> bool {
        match (self.cached_face, self.last_detection) {
            (Some(_), Some(last)) => now.saturating_duration_since(last) > self.redetect_interval,
            _ => true,
        }
    }

    /// Start over: forget the cached box and recalibrate expressions.
    pub fn reset(&mut self) {
        self.cached_face = None;
        self.last_detection = None;
        self.expressions.reset();
        log::info!("Tracking session reset");
    }

    /// Shared handle to the in-flight flag.
    pub fn slot(&self) -> InferenceSlot {
        self.slot.clone()
    }

    pub fn cached_face(&self) -> Option<ScoredBox> {
        self.cached_face
    }

    pub fn expressions(&self) -> &ExpressionEstimator {
        &self.expressions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::estimation::domain::expression_estimator::ExpressionWeights;
    use crate::landmarks::domain::face_landmarks::{FaceLandmarks, Point};
    use crate::shared::bounding_box::BoundingBox;

    type Script<T> = Arc<Mutex<VecDeque<Result<T, TrackingError>>>>;

    /// Replays scripted results; falls back to `default` when the script
    /// runs out.
    struct ScriptedDetector {
        script: Script<Vec<ScoredBox>>,
        default: Vec<ScoredBox>,
        calls: Arc<Mutex<usize>>,
    }

    impl FaceDetector for ScriptedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<ScoredBox>, TrackingError> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.default.clone()))
        }
    }

    struct ScriptedLandmarker {
        script: Script<Option<FaceLandmarks>>,
        boxes_seen: Arc<Mutex<Vec<BoundingBox>>>,
    }

    impl LandmarkDetector for ScriptedLandmarker {
        fn detect_landmarks(
            &mut self,
            _frame: &Frame,
            face: &BoundingBox,
        ) -> Result<Option<FaceLandmarks>, TrackingError> {
            self.boxes_seen.lock().unwrap().push(*face);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some(landmarks(0.0))))
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<Instant>>);

    impl ManualClock {
        fn advance(&self, ms: u64) {
            *self.0.lock().unwrap() += Duration::from_millis(ms);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    struct Harness {
        scheduler: TrackingScheduler,
        detections: Script<Vec<ScoredBox>>,
        landmark_results: Script<Option<FaceLandmarks>>,
        detect_calls: Arc<Mutex<usize>>,
        boxes_seen: Arc<Mutex<Vec<BoundingBox>>>,
        clock: ManualClock,
    }

    impl Harness {
        fn new() -> Self {
            let detections: Script<Vec<ScoredBox>> = Arc::default();
            let landmark_results: Script<Option<FaceLandmarks>> = Arc::default();
            let detect_calls = Arc::new(Mutex::new(0));
            let boxes_seen = Arc::new(Mutex::new(Vec::new()));
            let clock = ManualClock(Arc::new(Mutex::new(Instant::now())));

            let scheduler = TrackingScheduler::with_clock(
                Box::new(ScriptedDetector {
                    script: detections.clone(),
                    default: vec![face_box(10.0)],
                    calls: detect_calls.clone(),
                }),
                Box::new(ScriptedLandmarker {
                    script: landmark_results.clone(),
                    boxes_seen: boxes_seen.clone(),
                }),
                &TrackerConfig::default(),
                Box::new(clock.clone()),
            );
            Self {
                scheduler,
                detections,
                landmark_results,
                detect_calls,
                boxes_seen,
                clock,
            }
        }

        fn detect_calls(&self) -> usize {
            *self.detect_calls.lock().unwrap()
        }
    }

    fn face_box(x: f64) -> ScoredBox {
        ScoredBox::new(BoundingBox::new(x, 20.0, 80.0, 80.0), 0.9)
    }

    /// Plausible face; `mouth` widens the inner-lip gap.
    fn landmarks(mouth: f64) -> FaceLandmarks {
        let mut pts: Vec<Point> = (0..68)
            .map(|i| Point::new(40.0 + i as f64, 60.0 + (i % 5) as f64))
            .collect();
        pts[36] = Point::new(30.0, 50.0);
        pts[45] = Point::new(70.0, 50.0);
        pts[30] = Point::new(50.0, 65.0);
        pts[62] = Point::new(50.0, 80.0);
        pts[66] = Point::new(50.0, 82.0 + mouth);
        FaceLandmarks::new(pts).unwrap()
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, 3, index)
    }

    #[test]
    fn test_first_frame_detects_and_tracks() {
        let mut h = Harness::new();

        let result = h.scheduler.process(&frame(0)).unwrap();

        assert_eq!(h.detect_calls(), 1);
        assert_eq!(result.face, face_box(10.0));
        assert_eq!(h.scheduler.cached_face(), Some(face_box(10.0)));
        assert_eq!(result.orientation, Orientation::from_landmarks(&landmarks(0.0)));
    }

    #[test]
    fn test_cached_box_reused_until_interval_passes() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));

        h.clock.advance(200);
        h.scheduler.process(&frame(1));
        h.clock.advance(300);
        h.scheduler.process(&frame(2));
        assert_eq!(h.detect_calls(), 1, "exactly 500 ms is not yet stale");

        h.clock.advance(1);
        h.scheduler.process(&frame(3));
        assert_eq!(h.detect_calls(), 2);
    }

    #[test]
    fn test_redetection_moves_tracked_box() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));
        h.detections
            .lock()
            .unwrap()
            .push_back(Ok(vec![face_box(30.0), face_box(200.0)]));

        h.clock.advance(600);
        let result = h.scheduler.process(&frame(1)).unwrap();

        assert_eq!(result.face, face_box(30.0));
        let seen = h.boxes_seen.lock().unwrap();
        assert_eq!(seen[1], face_box(30.0).bbox);
    }

    #[test]
    fn test_busy_request_returns_none_without_touching_state() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));
        let cached = h.scheduler.cached_face();
        let expressions = h.scheduler.expressions().current();

        let held = h.scheduler.slot().try_acquire().unwrap();
        h.clock.advance(1000);
        assert!(h.scheduler.process(&frame(1)).is_none());

        assert_eq!(h.detect_calls(), 1);
        assert_eq!(h.boxes_seen.lock().unwrap().len(), 1);
        assert_eq!(h.scheduler.cached_face(), cached);
        assert_eq!(h.scheduler.expressions().current(), expressions);

        drop(held);
        assert!(h.scheduler.process(&frame(2)).is_some());
    }

    #[test]
    fn test_caller_held_guard_runs_and_releases() {
        let mut h = Harness::new();
        let slot = h.scheduler.slot();
        let guard = slot.try_acquire().unwrap();

        let result = h.scheduler.process_in_flight(&frame(0), guard);

        assert!(result.is_some());
        assert_eq!(h.detect_calls(), 1);
        assert!(!slot.is_busy());
    }

    #[test]
    fn test_no_face_is_no_result_and_retries_next_frame() {
        let mut h = Harness::new();
        h.detections.lock().unwrap().push_back(Ok(Vec::new()));

        assert!(h.scheduler.process(&frame(0)).is_none());
        assert!(h.scheduler.cached_face().is_none());
        assert!(h.boxes_seen.lock().unwrap().is_empty());

        assert!(h.scheduler.process(&frame(1)).is_some());
        assert_eq!(h.detect_calls(), 2);
    }

    #[test]
    fn test_lost_face_clears_cache() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));
        h.detections.lock().unwrap().push_back(Ok(Vec::new()));

        h.clock.advance(501);
        assert!(h.scheduler.process(&frame(1)).is_none());
        assert!(h.scheduler.cached_face().is_none());
    }

    #[test]
    fn test_detector_error_keeps_state_and_releases_slot() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));
        h.detections
            .lock()
            .unwrap()
            .push_back(Err(TrackingError::Backend("session lost".into())));

        h.clock.advance(600);
        assert!(h.scheduler.process(&frame(1)).is_none());

        assert_eq!(h.scheduler.cached_face(), Some(face_box(10.0)));
        assert!(!h.scheduler.slot().is_busy());
        // Detection is still due, so the next frame retries it.
        h.scheduler.process(&frame(2));
        assert_eq!(h.detect_calls(), 3);
    }

    #[test]
    fn test_landmark_error_keeps_calibration_and_cached_box() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));
        let before = h.scheduler.expressions().current();
        let ranges: Vec<_> = h
            .scheduler
            .expressions()
            .ranges()
            .iter()
            .map(|r| (*r).clone())
            .collect();
        h.detections
            .lock()
            .unwrap()
            .push_back(Ok(vec![face_box(50.0)]));
        h.landmark_results
            .lock()
            .unwrap()
            .push_back(Err(TrackingError::MalformedOutput {
                expected: 136,
                actual: 4,
            }));

        h.clock.advance(600);
        assert!(h.scheduler.process(&frame(1)).is_none());

        assert_eq!(h.scheduler.cached_face(), Some(face_box(10.0)));
        assert_eq!(h.scheduler.expressions().current(), before);
        let after: Vec<_> = h
            .scheduler
            .expressions()
            .ranges()
            .iter()
            .map(|r| (*r).clone())
            .collect();
        assert_eq!(ranges, after);
        assert!(!h.scheduler.slot().is_busy());
    }

    #[test]
    fn test_box_outside_frame_is_no_result() {
        let mut h = Harness::new();
        h.landmark_results.lock().unwrap().push_back(Ok(None));

        assert!(h.scheduler.process(&frame(0)).is_none());
        assert_eq!(h.scheduler.cached_face(), Some(face_box(10.0)));
    }

    #[test]
    fn test_expressions_follow_landmarks() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));
        h.landmark_results
            .lock()
            .unwrap()
            .push_back(Ok(Some(landmarks(20.0))));

        let result = h.scheduler.process(&frame(1)).unwrap();

        assert!(result.expressions.mouth_open > 0.5);
    }

    #[test]
    fn test_reset_forces_detection_and_clears_smoothing() {
        let mut h = Harness::new();
        h.scheduler.process(&frame(0));

        h.scheduler.reset();

        assert!(h.scheduler.cached_face().is_none());
        assert_eq!(h.scheduler.expressions().current(), ExpressionWeights::default());
        h.scheduler.process(&frame(1));
        assert_eq!(h.detect_calls(), 2);
    }
}

pub const DETECTOR_MODEL_NAME: &str = "tiny_face_detector.onnx";
pub const LANDMARK_MODEL_NAME: &str = "face_landmark_68.onnx";

/// Anchor prior sizes `(width, height)` in grid-cell units, one per anchor slot.
pub const DETECTOR_ANCHORS: [(f64, f64); 5] = [
    (1.603231, 2.094468),
    (6.041143, 7.080126),
    (2.882459, 3.518061),
    (4.266906, 5.178857),
    (9.041765, 10.66308),
];

/// Values per anchor prediction: tx, ty, tw, th, score logit.
pub const BOX_ENCODING_LEN: usize = 5;

pub const DETECTOR_MEAN_RGB: [f32; 3] = [117.001, 114.697, 97.404];
pub const DETECTOR_DIVISOR: f32 = 256.0;
pub const DEFAULT_DETECTOR_INPUT_SIZE: u32 = 160;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;
pub const DETECTOR_NMS_IOU: f64 = 0.4;

pub const LANDMARK_MEAN_RGB: [f32; 3] = [122.782, 117.001, 104.298];
pub const LANDMARK_DIVISOR: f32 = 255.0;
pub const LANDMARK_INPUT_SIZE: u32 = 112;
pub const LANDMARK_COUNT: usize = 68;

/// Full-frame detection reruns once the cached box is older than this.
pub const REDETECT_INTERVAL_MS: u64 = 500;

/// EMA factor for expression weights: each frame closes 30% of the gap.
pub const EXPRESSION_SMOOTHING: f64 = 0.3;

/// Per-observation pull of calibration bounds toward the latest value.
pub const RANGE_CONTRACTION_RATE: f64 = 0.001;

/// Bounds narrower than this map every value to 0.
pub const MIN_RANGE_SPAN: f64 = 0.001;

/// Degrees of yaw/pitch per unit of nose offset over eye distance.
pub const ORIENTATION_GAIN: f64 = 30.0;

/// Fraction of head yaw/pitch carried onto the avatar.
pub const RIG_ROTATION_DAMPING: f64 = 0.7;
/// Fraction of head roll carried onto the avatar.
pub const RIG_ROLL_DAMPING: f64 = 0.5;
pub const RIG_HEAD_EASING: f64 = 0.15;
pub const RIG_EYELID_EASING: f64 = 0.4;
pub const RIG_FEATURE_EASING: f64 = 0.3;

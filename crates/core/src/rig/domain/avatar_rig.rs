//! Follows tracking output with a damped avatar pose.
//!
//! Produces rig targets only; meshes, materials and drawing belong to the
//! renderer consuming [`RigPose`].

use serde::{Deserialize, Serialize};

use crate::estimation::domain::expression_estimator::ExpressionWeights;
use crate::estimation::domain::orientation::Orientation;
use crate::shared::constants::{
    RIG_EYELID_EASING, RIG_FEATURE_EASING, RIG_HEAD_EASING, RIG_ROLL_DAMPING,
    RIG_ROTATION_DAMPING,
};

const BROW_TRAVEL: f64 = 0.15;
const UPPER_LIP_TRAVEL: f64 = 0.04;
const LOWER_LIP_TRAVEL: f64 = 0.1;
const SMILE_WIDENING: f64 = 0.3;
const SMILE_CURL: f64 = 0.1;

/// Avatar state in renderer units.
///
/// Head angles are radians. Eyelids are closure fractions (0 open, 1 shut);
/// brow and lip values are vertical offsets from the rest pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigPose {
    pub head_yaw: f64,
    pub head_pitch: f64,
    pub head_roll: f64,
    pub eyelid_left: f64,
    pub eyelid_right: f64,
    pub brow_offset: f64,
    pub upper_lip_offset: f64,
    pub lower_lip_offset: f64,
    pub mouth_interior_scale: f64,
    pub mouth_width_scale: f64,
    pub smile_curl: f64,
}

impl Default for RigPose {
    fn default() -> Self {
        Self {
            head_yaw: 0.0,
            head_pitch: 0.0,
            head_roll: 0.0,
            eyelid_left: 0.0,
            eyelid_right: 0.0,
            brow_offset: 0.0,
            upper_lip_offset: 0.0,
            lower_lip_offset: 0.0,
            mouth_interior_scale: 0.0,
            mouth_width_scale: 1.0,
            smile_curl: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AvatarRig {
    pose: RigPose,
}

impl AvatarRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> RigPose {
        self.pose
    }

    /// Ease every rig channel one frame toward the latest tracking output.
    pub fn update(&mut self, orientation: &Orientation, expressions: &ExpressionWeights) -> RigPose {
        let p = &mut self.pose;

        ease(
            &mut p.head_yaw,
            (orientation.yaw * RIG_ROTATION_DAMPING).to_radians(),
            RIG_HEAD_EASING,
        );
        ease(
            &mut p.head_pitch,
            (orientation.pitch * RIG_ROTATION_DAMPING).to_radians(),
            RIG_HEAD_EASING,
        );
        ease(
            &mut p.head_roll,
            (orientation.roll * RIG_ROLL_DAMPING).to_radians(),
            RIG_HEAD_EASING,
        );

        ease(&mut p.eyelid_left, expressions.eye_blink_left, RIG_EYELID_EASING);
        ease(&mut p.eyelid_right, expressions.eye_blink_right, RIG_EYELID_EASING);

        ease(
            &mut p.brow_offset,
            expressions.brow_raise * BROW_TRAVEL,
            RIG_FEATURE_EASING,
        );

        let open = expressions.mouth_open;
        ease(&mut p.upper_lip_offset, open * UPPER_LIP_TRAVEL, RIG_FEATURE_EASING);
        ease(&mut p.lower_lip_offset, -open * LOWER_LIP_TRAVEL, RIG_FEATURE_EASING);
        ease(&mut p.mouth_interior_scale, open, RIG_FEATURE_EASING);

        let smile = expressions.mouth_smile;
        ease(
            &mut p.mouth_width_scale,
            1.0 + smile * SMILE_WIDENING,
            RIG_FEATURE_EASING,
        );
        ease(&mut p.smile_curl, smile * SMILE_CURL, RIG_FEATURE_EASING);

        self.pose
    }
}

fn ease(current: &mut f64, target: f64, rate: f64) {
    *current += (target - *current) * rate;
}

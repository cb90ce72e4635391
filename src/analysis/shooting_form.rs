// src/analysis/shooting_form.rs
//
// Geometric form metrics from a single pose. Each metric is in [0,1]; a
// metric whose joints were not detected scores 0 rather than failing.
//
//   elbow alignment  – horizontal kink along shoulder → elbow → wrist
//   shoulder square  – slope of the shoulder line
//   knee flexion     – hip/knee/ankle bend vs. the loaded-leg band
//   follow-through   – wrist dropped below the elbow
//   balance          – nose centered over the ankles

use super::thresholds::{KNEE_BAND_MAX_RAD, KNEE_BAND_MIN_RAD};
use crate::pose::{Hand, Joint, Keypoint, Pose};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShootingForm {
    pub elbow_alignment: f32,
    pub shoulder_square: f32,
    pub knee_flexion: f32,
    pub follow_through: f32,
    pub balance: f32,
    pub overall: f32,
}

impl ShootingForm {
    pub fn new(
        elbow_alignment: f32,
        shoulder_square: f32,
        knee_flexion: f32,
        follow_through: f32,
        balance: f32,
    ) -> Self {
        let overall =
            (elbow_alignment + shoulder_square + knee_flexion + follow_through + balance) / 5.0;
        Self {
            elbow_alignment,
            shoulder_square,
            knee_flexion,
            follow_through,
            balance,
            overall,
        }
    }
}

pub struct ShootingFormScorer {
    hand: Hand,
    knee_band: (f32, f32),
}

impl ShootingFormScorer {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            knee_band: (KNEE_BAND_MIN_RAD, KNEE_BAND_MAX_RAD),
        }
    }

    pub fn with_knee_band(mut self, min_rad: f32, max_rad: f32) -> Self {
        self.knee_band = (min_rad, max_rad);
        self
    }

    pub fn score(&self, pose: &Pose) -> ShootingForm {
        ShootingForm::new(
            self.elbow_alignment(pose),
            self.shoulder_square(pose),
            self.knee_flexion(pose),
            self.follow_through(pose),
            self.balance(pose),
        )
    }

    fn elbow_alignment(&self, pose: &Pose) -> f32 {
        let (Some(shoulder), Some(elbow), Some(wrist)) = (
            pose.get(self.hand.shoulder()),
            pose.get(self.hand.elbow()),
            pose.get(self.hand.wrist()),
        ) else {
            return 0.0;
        };

        let dx_upper = elbow.x - shoulder.x;
        let dx_fore = wrist.x - elbow.x;
        (1.0 - 2.0 * (dx_upper + dx_fore).abs()).max(0.0)
    }

    fn shoulder_square(&self, pose: &Pose) -> f32 {
        let (Some(left), Some(right)) = (
            pose.get(Joint::LeftShoulder),
            pose.get(Joint::RightShoulder),
        ) else {
            return 0.0;
        };

        let dx = right.x - left.x;
        if dx == 0.0 {
            // Vertical shoulder line: infinitely steep
            return 0.0;
        }
        let slope = (right.y - left.y) / dx;
        (1.0 - 10.0 * slope.abs()).max(0.0)
    }

    fn knee_flexion(&self, pose: &Pose) -> f32 {
        let (Some(hip), Some(knee), Some(ankle)) = (
            pose.get(self.hand.hip()),
            pose.get(self.hand.knee()),
            pose.get(self.hand.ankle()),
        ) else {
            return 0.0;
        };

        let Some(angle) = bend_angle(hip, knee, ankle) else {
            return 0.0;
        };

        let (lo, hi) = self.knee_band;
        if (lo..=hi).contains(&angle) {
            return 1.0;
        }
        let distance = if angle < lo { lo - angle } else { angle - hi };
        (1.0 - 2.0 * distance).max(0.0)
    }

    fn follow_through(&self, pose: &Pose) -> f32 {
        match (pose.get(self.hand.wrist()), pose.get(self.hand.elbow())) {
            (Some(wrist), Some(elbow)) if wrist.y > elbow.y => 1.0,
            _ => 0.0,
        }
    }

    fn balance(&self, pose: &Pose) -> f32 {
        let (Some(nose), Some(left), Some(right)) = (
            pose.get(Joint::Nose),
            pose.get(Joint::LeftAnkle),
            pose.get(Joint::RightAnkle),
        ) else {
            return 0.0;
        };

        let mid_x = (left.x + right.x) / 2.0;
        (1.0 - 5.0 * (nose.x - mid_x).abs()).max(0.0)
    }
}

impl Default for ShootingFormScorer {
    fn default() -> Self {
        Self::new(Hand::Right)
    }
}

/// Angle (radians) between hip→knee and knee→ankle. 0 is a straight leg.
/// `None` when a segment has zero length.
fn bend_angle(hip: Keypoint, knee: Keypoint, ankle: Keypoint) -> Option<f32> {
    let (ax, ay) = (knee.x - hip.x, knee.y - hip.y);
    let (bx, by) = (ankle.x - knee.x, ankle.y - knee.y);
    let norms = (ax * ax + ay * ay).sqrt() * (bx * bx + by * by).sqrt();
    if norms <= f32::EPSILON {
        return None;
    }
    let cos = ((ax * bx + ay * by) / norms).clamp(-1.0, 1.0);
    Some(cos.acos())
}

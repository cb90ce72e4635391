// src/analysis/shot_classifier.rs
//
// Turns a triggered trajectory plus the matching pose into a ShotAnalysis.
// Every rule is a fixed geometric heuristic on normalized coordinates:
//
//   type       – flight distance, then release height
//   outcome    – final point inside the hoop window with a proper peak
//   arc        – rise over horizontal travel, in degrees
//   confidence – mean of ball confidence, pose confidence, data sufficiency
//   feedback   – ordered coaching rules over form and arc

use super::shooting_form::{ShootingForm, ShootingFormScorer};
use super::thresholds::ShotThresholds;
use crate::ball::{BallTrajectory, Point2};
use crate::pose::{Hand, Pose};
use crate::shot::{ShotAnalysis, ShotOutcome, ShotType};

const ELBOW_TIP: &str = "Keep your shooting elbow tucked in line with the basket";
const SHOULDER_TIP: &str = "Square your shoulders to the hoop before you rise";
const FOLLOW_THROUGH_TIP: &str = "Hold your follow-through and snap your wrist toward the rim";
const BALANCE_TIP: &str = "Stay balanced with your head centered over your feet";
const MORE_ARC_TIP: &str = "Put more arc on the ball to give it a softer entry angle";
const FLATTEN_ARC_TIP: &str = "Flatten your arc slightly for a more direct path to the rim";

const MADE_PRAISE: &str = "Great shot! Your form and arc were right on target.";
const MISSED_PRAISE: &str = "Solid mechanics on that attempt. Keep the same form and the makes will come.";

pub struct ShotClassifier {
    thresholds: ShotThresholds,
    scorer: ShootingFormScorer,
}

impl ShotClassifier {
    pub fn new(thresholds: ShotThresholds, hand: Hand) -> Self {
        let scorer = ShootingFormScorer::new(hand)
            .with_knee_band(thresholds.knee_band_min_rad, thresholds.knee_band_max_rad);
        Self { thresholds, scorer }
    }

    /// `timestamp` is the video time of the triggering frame.
    pub fn classify(&self, trajectory: &BallTrajectory, pose: &Pose, timestamp: f64) -> ShotAnalysis {
        let start = trajectory.first().position;
        let end = trajectory.last().position;
        let peak_height = trajectory.peak_height();

        let shot_type = self.shot_type(trajectory);
        let outcome = self.outcome(end, peak_height);
        let arc = arc_angle(start, peak_height, end);
        let form = self.scorer.score(pose);
        let feedback = self.feedback(&form, arc, outcome);

        ShotAnalysis {
            shot_type,
            outcome,
            confidence: self.confidence(trajectory, pose),
            timestamp,
            duration: trajectory.duration(),
            form,
            trajectory: trajectory.clone(),
            release_point: start,
            peak_height,
            arc_angle: arc,
            feedback,
        }
    }

    pub fn shot_type(&self, trajectory: &BallTrajectory) -> ShotType {
        let release = trajectory.first().position;
        if shot_distance(trajectory) > self.thresholds.three_point_distance {
            ShotType::ThreePointer
        } else if release.y > self.thresholds.layup_release_y {
            ShotType::Layup
        } else {
            ShotType::JumpShot
        }
    }

    pub fn outcome(&self, end: Point2, peak_height: f32) -> ShotOutcome {
        let t = &self.thresholds;
        let in_hoop_window =
            (t.hoop_min_x..=t.hoop_max_x).contains(&end.x) && end.y < t.hoop_max_y;
        let good_peak = (peak_height - t.ideal_peak_y).abs() < t.peak_tolerance;

        if in_hoop_window && good_peak {
            ShotOutcome::Made
        } else {
            ShotOutcome::Missed
        }
    }

    /// Always within [0,1] for confidences within [0,1].
    pub fn confidence(&self, trajectory: &BallTrajectory, pose: &Pose) -> f32 {
        let ball = trajectory.average_confidence();
        let sufficiency = (trajectory.len() as f32
            / self.thresholds.confidence_saturation_points.max(1) as f32)
            .min(1.0);
        ((ball + pose.confidence + sufficiency) / 3.0).clamp(0.0, 1.0)
    }

    pub fn feedback(&self, form: &ShootingForm, arc_degrees: f32, outcome: ShotOutcome) -> String {
        let limit = self.thresholds.form_feedback_threshold;
        let mut tips: Vec<&str> = Vec::new();

        if form.elbow_alignment < limit {
            tips.push(ELBOW_TIP);
        }
        if form.shoulder_square < limit {
            tips.push(SHOULDER_TIP);
        }
        if form.follow_through < limit {
            tips.push(FOLLOW_THROUGH_TIP);
        }
        if form.balance < limit {
            tips.push(BALANCE_TIP);
        }

        if arc_degrees < self.thresholds.min_arc_degrees {
            tips.push(MORE_ARC_TIP);
        } else if arc_degrees > self.thresholds.max_arc_degrees {
            tips.push(FLATTEN_ARC_TIP);
        }

        if tips.is_empty() {
            return match outcome {
                ShotOutcome::Made => MADE_PRAISE.to_string(),
                _ => MISSED_PRAISE.to_string(),
            };
        }

        format!("{}.", tips.join(". "))
    }
}

impl Default for ShotClassifier {
    fn default() -> Self {
        Self::new(ShotThresholds::default(), Hand::Right)
    }
}

/// Straight-line distance from release to the last tracked point.
pub fn shot_distance(trajectory: &BallTrajectory) -> f32 {
    trajectory.first().position.distance(&trajectory.last().position)
}

/// Launch angle in degrees; 0 when the ball has no horizontal travel.
pub fn arc_angle(start: Point2, peak_y: f32, end: Point2) -> f32 {
    let horizontal = (end.x - start.x).abs();
    if horizontal == 0.0 {
        return 0.0;
    }
    let vertical = (peak_y - start.y).abs();
    (vertical / horizontal).atan().to_degrees()
}

// src/analysis/thresholds.rs
//
// Heuristic constants for shot detection and classification. All values
// are in normalized screen units (y grows downward) unless suffixed.

use serde::{Deserialize, Serialize};

pub const SHOT_COOLDOWN_S: f64 = 2.0;
pub const MIN_TRAJECTORY_POINTS: usize = 10;
/// Start-to-peak climb required for a shot arc
pub const MIN_RISE: f32 = 0.10;
/// Peak-to-end drop required for a shot arc
pub const MIN_FALL: f32 = 0.05;

pub const THREE_POINT_DISTANCE: f32 = 0.7;
/// Release below this line (larger y) reads as a layup
pub const LAYUP_RELEASE_Y: f32 = 0.8;

pub const HOOP_MIN_X: f32 = 0.4;
pub const HOOP_MAX_X: f32 = 0.6;
pub const HOOP_MAX_Y: f32 = 0.3;
pub const IDEAL_PEAK_Y: f32 = 0.2;
pub const PEAK_TOLERANCE: f32 = 0.1;

pub const CONFIDENCE_SATURATION_POINTS: usize = 30;

pub const MIN_ARC_DEGREES: f32 = 35.0;
pub const MAX_ARC_DEGREES: f32 = 55.0;
pub const FORM_FEEDBACK_THRESHOLD: f32 = 0.7;

/// ~15°
pub const KNEE_BAND_MIN_RAD: f32 = 0.26;
/// ~30°
pub const KNEE_BAND_MAX_RAD: f32 = 0.52;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotThresholds {
    pub cooldown_s: f64,
    pub min_trajectory_points: usize,
    pub min_rise: f32,
    pub min_fall: f32,
    pub three_point_distance: f32,
    pub layup_release_y: f32,
    pub hoop_min_x: f32,
    pub hoop_max_x: f32,
    pub hoop_max_y: f32,
    pub ideal_peak_y: f32,
    pub peak_tolerance: f32,
    pub confidence_saturation_points: usize,
    pub min_arc_degrees: f32,
    pub max_arc_degrees: f32,
    pub form_feedback_threshold: f32,
    pub knee_band_min_rad: f32,
    pub knee_band_max_rad: f32,
}

impl Default for ShotThresholds {
    fn default() -> Self {
        Self {
            cooldown_s: SHOT_COOLDOWN_S,
            min_trajectory_points: MIN_TRAJECTORY_POINTS,
            min_rise: MIN_RISE,
            min_fall: MIN_FALL,
            three_point_distance: THREE_POINT_DISTANCE,
            layup_release_y: LAYUP_RELEASE_Y,
            hoop_min_x: HOOP_MIN_X,
            hoop_max_x: HOOP_MAX_X,
            hoop_max_y: HOOP_MAX_Y,
            ideal_peak_y: IDEAL_PEAK_Y,
            peak_tolerance: PEAK_TOLERANCE,
            confidence_saturation_points: CONFIDENCE_SATURATION_POINTS,
            min_arc_degrees: MIN_ARC_DEGREES,
            max_arc_degrees: MAX_ARC_DEGREES,
            form_feedback_threshold: FORM_FEEDBACK_THRESHOLD,
            knee_band_min_rad: KNEE_BAND_MIN_RAD,
            knee_band_max_rad: KNEE_BAND_MAX_RAD,
        }
    }
}

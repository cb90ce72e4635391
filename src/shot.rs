// src/shot.rs

use crate::analysis::shooting_form::ShootingForm;
use crate::ball::{BallSighting, BallTrajectory, Point2};
use crate::pose::Pose;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotType {
    JumpShot,
    ThreePointer,
    Layup,
    FreeThrow,
    HookShot,
    Fadeaway,
}

impl ShotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JumpShot => "JUMP_SHOT",
            Self::ThreePointer => "THREE_POINTER",
            Self::Layup => "LAYUP",
            Self::FreeThrow => "FREE_THROW",
            Self::HookShot => "HOOK_SHOT",
            Self::Fadeaway => "FADEAWAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    Made,
    Missed,
    Unknown,
}

impl ShotOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Made => "MADE",
            Self::Missed => "MISSED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// One classified shot attempt. Built once by the classifier and only ever
/// handed out by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotAnalysis {
    pub shot_type: ShotType,
    pub outcome: ShotOutcome,
    pub confidence: f32,
    /// Video time (seconds) of the frame that triggered the shot
    pub timestamp: f64,
    /// Seconds covered by the trajectory window
    pub duration: f64,
    pub form: ShootingForm,
    pub trajectory: BallTrajectory,
    pub release_point: Point2,
    pub peak_height: f32,
    pub arc_angle: f32,
    pub feedback: String,
}

/// Everything produced for one processed frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnalysisResult {
    pub frame_index: u64,
    pub pose: Option<Pose>,
    pub ball: Option<BallSighting>,
    pub shot: Option<ShotAnalysis>,
    pub processing_time_ms: f64,
}

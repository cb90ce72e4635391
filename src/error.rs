// src/error.rs

use thiserror::Error;

/// Errors surfaced by the tracking pipeline.
///
/// None of these are fatal: the caller is expected to carry on with the
/// next frame.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CVError {
    #[error("pose detection failed: {0}")]
    PoseDetectionFailed(String),

    #[error("ball detection failed: {0}")]
    BallDetectionFailed(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A previous `process()` call has not completed yet.
    #[error("processing busy: a frame is already in flight")]
    ProcessingBusy,

    /// Trajectory too short to classify. Never returned from `process()`.
    #[error("insufficient data: {points} trajectory points, {required} required")]
    InsufficientData { points: usize, required: usize },

    #[error("{detector} detector exceeded {timeout_ms}ms deadline")]
    DetectorTimeout {
        detector: &'static str,
        timeout_ms: u64,
    },
}

// src/types.rs

use crate::analysis::thresholds::ShotThresholds;
use crate::error::CVError;
use crate::pose::Hand;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub shot: ShotThresholds,
    pub performance: PerformanceConfig,
    pub detectors: DetectorConfig,
    pub coaching: CoachingConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// ~4s at 30fps
    pub pose_history_capacity: usize,
    /// ~3s at 30fps
    pub ball_history_capacity: usize,
    /// Max distance (seconds) between trajectory start and the pose used to classify it
    pub pose_match_tolerance_s: f64,
    pub shooting_hand: Hand,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            pose_history_capacity: 120,
            ball_history_capacity: 90,
            pose_match_tolerance_s: 0.5,
            shooting_hand: Hand::Right,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Soft latency target; breaches are logged, never enforced
    pub latency_target_ms: f64,
    pub min_frame_rate: f64,
    /// Number of latency samples in the rolling average
    pub latency_window: usize,
    /// Refresh resident memory every N frames (0 disables sampling)
    pub memory_sample_interval: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            latency_target_ms: 500.0,
            min_frame_rate: 20.0,
            latency_window: 60,
            memory_sample_interval: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Hard per-call deadline. `None` leaves slow detectors uncancelled.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachingConfig {
    pub enabled: bool,
    pub server_url: String,
    pub timeout_secs: u64,
}

impl Default for CoachingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub input_path: String,
    pub output_dir: String,
    pub frame_width: usize,
    pub frame_height: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_path: "recordings/session.jsonl".to_string(),
            output_dir: "output".to_string(),
            frame_width: 64,
            frame_height: 36,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "shot_tracker=info".to_string(),
        }
    }
}

/// Bytes per pixel of a packed RGB8 frame.
pub const FRAME_CHANNELS: usize = 3;

/// One decoded video frame. Pixel data is shared so adapters can hold on to
/// it without copying.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Arc<[u8]>,
    pub width: usize,
    pub height: usize,
    pub index: u64,
    /// Video time in seconds
    pub timestamp: f64,
}

impl Frame {
    pub fn new(data: Arc<[u8]>, width: usize, height: usize, index: u64, timestamp: f64) -> Self {
        Self {
            data,
            width,
            height,
            index,
            timestamp,
        }
    }

    pub fn validate(&self) -> Result<(), CVError> {
        if self.width == 0 || self.height == 0 {
            return Err(CVError::InvalidFrame(format!(
                "zero-sized frame {}x{}",
                self.width, self.height
            )));
        }

        let expected = self
            .width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(FRAME_CHANNELS))
            .ok_or_else(|| {
                CVError::InvalidFrame(format!(
                    "frame dimensions {}x{} overflow",
                    self.width, self.height
                ))
            })?;
        if self.data.len() != expected {
            return Err(CVError::InvalidFrame(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                self.width,
                self.height,
                self.data.len()
            )));
        }

        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return Err(CVError::InvalidFrame(format!(
                "bad timestamp {}",
                self.timestamp
            )));
        }

        Ok(())
    }
}

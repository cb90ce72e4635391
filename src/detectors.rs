// src/detectors.rs
//
// Capability adapters consumed by the frame processor, plus replay
// adapters that serve detections recorded from an earlier session.
//
// Recording format (JSON Lines, one object per frame, in frame order):
//   {"timestamp": 0.033, "pose": {...} | null, "ball": {"x":..,"y":..,"confidence":..} | null}

use crate::ball::BallSighting;
use crate::error::CVError;
use crate::pose::Pose;
use crate::types::Frame;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Returns at most one pose per frame; `None` when nothing confident was found.
#[async_trait]
pub trait PoseDetector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<Option<Pose>, CVError>;
}

/// Returns at most one ball per frame. Velocity is left at zero; the
/// trajectory buffer derives it.
#[async_trait]
pub trait BallDetector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<Option<BallSighting>, CVError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecordedBall {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub timestamp: f64,
    #[serde(default)]
    pub pose: Option<Pose>,
    #[serde(default)]
    pub ball: Option<RecordedBall>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedSession {
    frames: Arc<Vec<RecordedFrame>>,
}

impl RecordedSession {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self {
            frames: Arc::new(frames),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {}", path.display()))?;
        let session = Self::parse(&contents)?;
        info!(
            "Loaded {} recorded frames from {}",
            session.len(),
            path.display()
        );
        Ok(session)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut frames = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(line)
                .with_context(|| format!("Bad recorded frame on line {}", line_no + 1))?;
            frames.push(frame);
        }
        Ok(Self::new(frames))
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn at(&self, frame: &Frame) -> Option<&RecordedFrame> {
        self.frames.get(frame.index as usize)
    }

    pub fn pose_detector(&self) -> ReplayPoseDetector {
        ReplayPoseDetector {
            session: self.clone(),
        }
    }

    pub fn ball_detector(&self) -> ReplayBallDetector {
        ReplayBallDetector {
            session: self.clone(),
        }
    }
}

/// Serves the recorded pose for `frame.index`.
pub struct ReplayPoseDetector {
    session: RecordedSession,
}

#[async_trait]
impl PoseDetector for ReplayPoseDetector {
    async fn detect(&self, frame: &Frame) -> Result<Option<Pose>, CVError> {
        Ok(self.session.at(frame).and_then(|f| f.pose.clone()))
    }
}

/// Serves the recorded ball for `frame.index`, stamped with the frame time.
pub struct ReplayBallDetector {
    session: RecordedSession,
}

#[async_trait]
impl BallDetector for ReplayBallDetector {
    async fn detect(&self, frame: &Frame) -> Result<Option<BallSighting>, CVError> {
        Ok(self.session.at(frame).and_then(|f| {
            f.ball
                .map(|b| BallSighting::new(frame.timestamp, b.x, b.y, b.confidence))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FRAME_CHANNELS;

    fn frame(index: u64, timestamp: f64) -> Frame {
        Frame::new(vec![0u8; 2 * 2 * FRAME_CHANNELS].into(), 2, 2, index, timestamp)
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let log = r#"
{"timestamp": 0.0, "ball": {"x": 0.5, "y": 0.8, "confidence": 0.9}}

{"timestamp": 0.033, "pose": null, "ball": null}
"#;
        let session = RecordedSession::parse(log).unwrap();
        assert_eq!(session.len(), 2);
        assert!(session.frames()[0].pose.is_none());
        assert!(session.frames()[1].ball.is_none());
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = RecordedSession::parse("{\"timestamp\": 0.0}\nnot json\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[tokio::test]
    async fn test_replay_detectors_follow_frame_index() {
        let session = RecordedSession::new(vec![
            RecordedFrame {
                timestamp: 0.0,
                pose: Some(Pose::new(0.0, 0.7)),
                ball: None,
            },
            RecordedFrame {
                timestamp: 0.033,
                pose: None,
                ball: Some(RecordedBall {
                    x: 0.4,
                    y: 0.6,
                    confidence: 0.8,
                }),
            },
        ]);
        let poses = session.pose_detector();
        let balls = session.ball_detector();

        assert_eq!(poses.detect(&frame(0, 0.0)).await.unwrap().unwrap().confidence, 0.7);
        assert!(balls.detect(&frame(0, 0.0)).await.unwrap().is_none());

        let ball = balls.detect(&frame(1, 0.033)).await.unwrap().unwrap();
        assert_eq!(ball.timestamp, 0.033);
        assert_eq!(ball.position.x, 0.4);

        // Past the end of the recording: nothing detected
        assert!(poses.detect(&frame(5, 0.2)).await.unwrap().is_none());
    }
}

// src/lib.rs

pub mod analysis;
pub mod ball;
pub mod coaching_client;
pub mod config;
pub mod detectors;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod pose;
pub mod session;
pub mod shot;
pub mod types;

pub use analysis::{ShootingForm, ShotThresholds};
pub use ball::{BallSighting, BallTrajectory, Point2};
pub use detectors::{BallDetector, PoseDetector, RecordedSession};
pub use error::CVError;
pub use pipeline::{FrameProcessor, PerformanceMetrics, PipelineEvent};
pub use pose::{Hand, Joint, Keypoint, Pose};
pub use session::SessionStats;
pub use shot::{FrameAnalysisResult, ShotAnalysis, ShotOutcome, ShotType};
pub use types::{Config, Frame};

// src/history/mod.rs
//
// Bounded, time-ordered detection windows owned by the frame processor.

pub mod ball_history;
pub mod pose_history;
pub mod ring_buffer;

pub use ball_history::BallTrajectoryBuffer;
pub use pose_history::PoseHistory;
pub use ring_buffer::RingBuffer;

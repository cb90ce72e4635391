// src/history/pose_history.rs
//
// Recent pose detections. When a shot triggers, the classifier looks up the
// pose closest in time to the start of the ball's flight, not whatever pose
// happened to arrive last.

use super::ring_buffer::RingBuffer;
use crate::pose::Pose;

const DEFAULT_CAPACITY: usize = 120; // ~4s at 30fps

pub struct PoseHistory {
    entries: RingBuffer<Pose>,
}

impl PoseHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RingBuffer::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, pose: Pose) {
        self.entries.push(pose);
    }

    /// Pose nearest to `timestamp`, provided it lies within `tolerance` seconds.
    /// Ties go to the more recent pose.
    pub fn nearest_to(&self, timestamp: f64, tolerance: f64) -> Option<&Pose> {
        self.entries
            .iter()
            .rev()
            .map(|pose| (pose, (pose.timestamp - timestamp).abs()))
            .filter(|(_, gap)| *gap <= tolerance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(pose, _)| pose)
    }

    pub fn latest(&self) -> Option<&Pose> {
        self.entries.newest()
    }

    pub fn snapshot(&self) -> Vec<Pose> {
        self.entries.to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for PoseHistory {
    fn default() -> Self {
        Self::new()
    }
}

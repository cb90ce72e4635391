// src/history/ball_history.rs

use super::ring_buffer::RingBuffer;
use crate::ball::{BallSighting, BallTrajectory};

const DEFAULT_CAPACITY: usize = 90; // ~3s at 30fps

/// Recent ball sightings. Velocity is derived on insert from the sighting
/// immediately before it, so evicting old points never changes it.
pub struct BallTrajectoryBuffer {
    points: RingBuffer<BallSighting>,
}

impl BallTrajectoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: RingBuffer::with_capacity(capacity),
        }
    }

    /// Stores the sighting with its derived velocity and returns the stored copy.
    pub fn push(&mut self, mut sighting: BallSighting) -> BallSighting {
        sighting.velocity = match self.points.newest() {
            Some(previous) => sighting.velocity_from(previous),
            None => Default::default(),
        };
        self.points.push(sighting);
        sighting
    }

    /// Immutable copy of the current window.
    pub fn trajectory(&self) -> Option<BallTrajectory> {
        BallTrajectory::new(self.points.to_vec())
    }

    pub fn latest(&self) -> Option<&BallSighting> {
        self.points.newest()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for BallTrajectoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::Velocity;

    #[test]
    fn test_first_sighting_has_zero_velocity() {
        let mut buffer = BallTrajectoryBuffer::new();
        let stored = buffer.push(BallSighting::new(0.0, 0.5, 0.5, 0.9));
        assert_eq!(stored.velocity, Velocity::default());
    }

    #[test]
    fn test_velocity_derived_from_previous() {
        let mut buffer = BallTrajectoryBuffer::new();
        buffer.push(BallSighting::new(0.0, 0.40, 0.80, 0.9));
        let stored = buffer.push(BallSighting::new(0.1, 0.42, 0.70, 0.9));

        assert!((stored.velocity.vx - 0.2).abs() < 1e-4);
        assert!((stored.velocity.vy + 1.0).abs() < 1e-4);
        assert_eq!(buffer.latest().unwrap().velocity, stored.velocity);
    }

    #[test]
    fn test_buffer_bounded_fifo() {
        let mut buffer = BallTrajectoryBuffer::new();
        for i in 0..200 {
            buffer.push(BallSighting::new(i as f64 / 30.0, 0.5, 0.5, 0.9));
        }
        assert_eq!(buffer.len(), 90);

        let trajectory = buffer.trajectory().unwrap();
        assert_eq!(trajectory.start_time, 110.0 / 30.0);
        assert_eq!(trajectory.end_time, 199.0 / 30.0);
    }

    #[test]
    fn test_empty_buffer_has_no_trajectory() {
        let buffer = BallTrajectoryBuffer::new();
        assert!(buffer.trajectory().is_none());
    }
}

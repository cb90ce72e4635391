// src/analysis/shot_trigger.rs
//
// Decides, once per frame, whether the ball window holds a completed
// shooting arc: enough points, a clear rise to a peak followed by a fall,
// and the cooldown since the previous shot elapsed.
//
// Sightings up to and including the last triggered arc are consumed: the
// ball window outlives the cooldown, so only newer points are evaluated.

use super::thresholds::ShotThresholds;
use crate::ball::{BallSighting, BallTrajectory};
use crate::error::CVError;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerOutcome {
    /// Shot accepted; the cooldown clock now points at this frame.
    Triggered,
    /// Arc present but the previous shot was too recent.
    CoolingDown { remaining_s: f64 },
    /// Window does not rise then fall.
    NoArc,
}

/// Heights sampled from the window (smaller y = higher).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcProfile {
    pub start_height: f32,
    pub peak_height: f32,
    pub end_height: f32,
}

impl ArcProfile {
    /// Start of the first third, minimum over the window, end of the last third.
    pub fn from_points(points: &[BallSighting]) -> Option<Self> {
        let third = (points.len() / 3).max(1);
        let first_third = points.get(..third)?;
        let last_third = points.get(points.len() - third..)?;

        let start_height = first_third.first()?.position.y;
        let end_height = last_third.last()?.position.y;
        let peak_height = points
            .iter()
            .map(|p| p.position.y)
            .fold(f32::INFINITY, f32::min);

        Some(Self {
            start_height,
            peak_height,
            end_height,
        })
    }

    pub fn rise(&self) -> f32 {
        self.start_height - self.peak_height
    }

    pub fn fall(&self) -> f32 {
        self.end_height - self.peak_height
    }

    pub fn is_parabolic(&self, min_rise: f32, min_fall: f32) -> bool {
        self.rise() > min_rise && self.peak_height - self.end_height < -min_fall
    }
}

pub struct ShotTrigger {
    cooldown_s: f64,
    min_points: usize,
    min_rise: f32,
    min_fall: f32,
    last_shot_time: Option<f64>,
    consumed_until: Option<f64>,
}

impl ShotTrigger {
    pub fn new(thresholds: &ShotThresholds) -> Self {
        Self {
            cooldown_s: thresholds.cooldown_s,
            min_points: thresholds.min_trajectory_points,
            min_rise: thresholds.min_rise,
            min_fall: thresholds.min_fall,
            last_shot_time: None,
            consumed_until: None,
        }
    }

    /// Sightings newer than the last triggered arc, oldest first.
    pub fn unconsumed<'a>(&self, trajectory: &'a BallTrajectory) -> &'a [BallSighting] {
        let points = trajectory.points();
        match self.consumed_until {
            Some(mark) => &points[points.partition_point(|p| p.timestamp <= mark)..],
            None => points,
        }
    }

    /// `now` is the current frame's video time in seconds.
    pub fn check(
        &mut self,
        trajectory: &BallTrajectory,
        now: f64,
    ) -> Result<TriggerOutcome, CVError> {
        let fresh = self.unconsumed(trajectory);
        if fresh.len() < self.min_points {
            return Err(CVError::InsufficientData {
                points: fresh.len(),
                required: self.min_points,
            });
        }

        let Some(profile) = ArcProfile::from_points(fresh) else {
            return Ok(TriggerOutcome::NoArc);
        };
        if !profile.is_parabolic(self.min_rise, self.min_fall) {
            return Ok(TriggerOutcome::NoArc);
        }

        if let Some(last) = self.last_shot_time {
            let elapsed = now - last;
            if elapsed < self.cooldown_s {
                return Ok(TriggerOutcome::CoolingDown {
                    remaining_s: self.cooldown_s - elapsed,
                });
            }
        }

        debug!(
            "Arc detected: start={:.3} peak={:.3} end={:.3} ({} pts)",
            profile.start_height,
            profile.peak_height,
            profile.end_height,
            fresh.len()
        );

        self.last_shot_time = Some(now);
        self.consumed_until = fresh.last().map(|p| p.timestamp);
        Ok(TriggerOutcome::Triggered)
    }

    pub fn last_shot_time(&self) -> Option<f64> {
        self.last_shot_time
    }

    pub fn reset(&mut self) {
        self.last_shot_time = None;
        self.consumed_until = None;
    }
}

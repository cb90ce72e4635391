// src/ball.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Normalized units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSighting {
    /// Video time in seconds
    pub timestamp: f64,
    pub position: Point2,
    pub confidence: f32,
    /// Filled in by the trajectory buffer from the preceding sighting
    #[serde(default)]
    pub velocity: Velocity,
}

impl BallSighting {
    pub fn new(timestamp: f64, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            timestamp,
            position: Point2::new(x, y),
            confidence,
            velocity: Velocity::default(),
        }
    }

    /// Velocity relative to an earlier sighting; zero when time does not advance.
    pub fn velocity_from(&self, previous: &BallSighting) -> Velocity {
        let dt = (self.timestamp - previous.timestamp) as f32;
        if dt <= 0.0 {
            return Velocity::default();
        }
        Velocity {
            vx: (self.position.x - previous.position.x) / dt,
            vy: (self.position.y - previous.position.y) / dt,
        }
    }
}

/// Immutable snapshot of the trajectory window. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryRecord")]
pub struct BallTrajectory {
    points: Vec<BallSighting>,
    pub start_time: f64,
    pub end_time: f64,
}

/// Wire shape of a trajectory; start and end times are recomputed.
#[derive(Deserialize)]
struct TrajectoryRecord {
    points: Vec<BallSighting>,
}

impl TryFrom<TrajectoryRecord> for BallTrajectory {
    type Error = &'static str;

    fn try_from(record: TrajectoryRecord) -> Result<Self, Self::Error> {
        Self::new(record.points).ok_or("trajectory has no points")
    }
}

impl BallTrajectory {
    /// Returns `None` for an empty window.
    pub fn new(points: Vec<BallSighting>) -> Option<Self> {
        let start_time = points.first()?.timestamp;
        let end_time = points.last()?.timestamp;
        Some(Self {
            points,
            start_time,
            end_time,
        })
    }

    pub fn points(&self) -> &[BallSighting] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &BallSighting {
        &self.points[0]
    }

    pub fn last(&self) -> &BallSighting {
        &self.points[self.points.len() - 1]
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Mean of the per-sighting velocities.
    pub fn average_velocity(&self) -> Velocity {
        let n = self.points.len() as f32;
        let (vx, vy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.velocity.vx, sy + p.velocity.vy));
        Velocity {
            vx: vx / n,
            vy: vy / n,
        }
    }

    /// Highest point of the arc, i.e. the minimum y.
    pub fn peak_height(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.position.y)
            .fold(f32::INFINITY, f32::min)
    }

    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.points.iter().map(|p| p.confidence).sum();
        sum / self.points.len() as f32
    }
}

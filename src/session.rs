// src/session.rs
//
// Aggregate statistics over the shots of one coaching session.

use crate::shot::{ShotAnalysis, ShotOutcome, ShotType};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub attempts: usize,
    pub made: usize,
    pub missed: usize,
    pub unknown: usize,
    /// Made over decided (made + missed) attempts; 0 when none decided
    pub field_goal_pct: f32,
    pub by_type: BTreeMap<&'static str, usize>,
    pub avg_arc_angle: f32,
    pub avg_confidence: f32,
    pub avg_form_score: f32,
}

impl SessionStats {
    pub fn from_shots(shots: &[ShotAnalysis]) -> Self {
        if shots.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            attempts: shots.len(),
            ..Self::default()
        };

        for shot in shots {
            match shot.outcome {
                ShotOutcome::Made => stats.made += 1,
                ShotOutcome::Missed => stats.missed += 1,
                ShotOutcome::Unknown => stats.unknown += 1,
            }
            *stats.by_type.entry(shot.shot_type.as_str()).or_insert(0) += 1;
        }

        let decided = stats.made + stats.missed;
        if decided > 0 {
            stats.field_goal_pct = stats.made as f32 / decided as f32 * 100.0;
        }

        let n = shots.len() as f32;
        stats.avg_arc_angle = shots.iter().map(|s| s.arc_angle).sum::<f32>() / n;
        stats.avg_confidence = shots.iter().map(|s| s.confidence).sum::<f32>() / n;
        stats.avg_form_score = shots.iter().map(|s| s.form.overall).sum::<f32>() / n;

        stats
    }

    pub fn count(&self, shot_type: ShotType) -> usize {
        self.by_type.get(shot_type.as_str()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::shooting_form::ShootingForm;
    use crate::ball::{BallSighting, BallTrajectory, Point2};

    fn shot(shot_type: ShotType, outcome: ShotOutcome, arc: f32) -> ShotAnalysis {
        let trajectory = BallTrajectory::new(vec![
            BallSighting::new(0.0, 0.5, 0.8, 0.9),
            BallSighting::new(0.5, 0.5, 0.2, 0.9),
        ])
        .unwrap();
        ShotAnalysis {
            shot_type,
            outcome,
            confidence: 0.6,
            timestamp: 0.5,
            duration: 0.5,
            form: ShootingForm::new(0.8, 0.8, 0.8, 0.8, 0.8),
            trajectory,
            release_point: Point2::new(0.5, 0.8),
            peak_height: 0.2,
            arc_angle: arc,
            feedback: String::new(),
        }
    }

    #[test]
    fn test_empty_session() {
        let stats = SessionStats::from_shots(&[]);
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.field_goal_pct, 0.0);
    }

    #[test]
    fn test_session_totals() {
        let shots = vec![
            shot(ShotType::JumpShot, ShotOutcome::Made, 40.0),
            shot(ShotType::JumpShot, ShotOutcome::Missed, 50.0),
            shot(ShotType::ThreePointer, ShotOutcome::Made, 45.0),
            shot(ShotType::Layup, ShotOutcome::Unknown, 45.0),
        ];
        let stats = SessionStats::from_shots(&shots);

        assert_eq!(stats.attempts, 4);
        assert_eq!(stats.made, 2);
        assert_eq!(stats.missed, 1);
        assert_eq!(stats.unknown, 1);
        assert!((stats.field_goal_pct - 200.0 / 3.0).abs() < 1e-3);
        assert_eq!(stats.count(ShotType::JumpShot), 2);
        assert_eq!(stats.count(ShotType::Fadeaway), 0);
        assert!((stats.avg_arc_angle - 45.0).abs() < 1e-5);
        assert!((stats.avg_form_score - 0.8).abs() < 1e-5);
    }
}

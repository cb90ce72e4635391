// src/coaching_client.rs
//
// Async HTTP client for the coaching text-generation server.
//
// Sends a classified shot (or a whole session) with all the numbers the
// tracker produced, and gets back free-form coaching text. The tracker
// never depends on the answer: failures are logged and returned to the
// caller, tracking state is untouched.

use crate::analysis::shooting_form::ShootingForm;
use crate::ball::Point2;
use crate::session::SessionStats;
use crate::shot::ShotAnalysis;
use crate::types::CoachingConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// REQUEST TYPES
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ShotFeedbackRequest {
    pub request_id: String,
    pub shot_type: String,
    pub outcome: String,
    pub timestamp_s: f64,
    pub duration_s: f64,
    pub confidence: f32,
    pub arc_angle_degrees: f32,
    pub peak_height: f32,
    pub release_point: Point2,
    pub trajectory_points: usize,
    /// Mean ball speed over the arc, normalized units per second
    pub ball_speed: f32,
    pub form: ShootingForm,
    /// Rule-based feedback already produced on-device
    pub heuristic_feedback: String,
}

#[derive(Debug, Serialize)]
pub struct SessionSummaryRequest {
    pub request_id: String,
    pub stats: SessionStats,
    pub shots: Vec<ShotFeedbackRequest>,
}

// ============================================================================
// RESPONSE TYPE
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct CoachingClient {
    server_url: String,
    http_client: reqwest::Client,
}

impl CoachingClient {
    pub fn new(config: &CoachingConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            server_url: config.server_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub async fn shot_feedback(&self, shot: &ShotAnalysis) -> Result<String> {
        let request = build_shot_request(shot);
        info!(
            "🌐 Requesting coaching feedback: {} {} | {}",
            request.shot_type, request.outcome, request.request_id
        );
        self.post("api/shot-feedback", &request).await
    }

    pub async fn session_summary(&self, shots: &[ShotAnalysis]) -> Result<String> {
        let request = build_session_request(shots);
        info!(
            "🌐 Requesting session summary: {} shots | {}",
            request.stats.attempts, request.request_id
        );
        self.post("api/session-summary", &request).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}/{}", self.server_url, path);

        let resp = match self.http_client.post(&url).json(body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("🌐 Failed to reach coaching server: {}", e);
                return Err(e).context("Connection error");
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("🌐 Coaching server error {}: {}", status, body);
            bail!("HTTP {}: {}", status, body);
        }

        let parsed: FeedbackResponse = resp
            .json()
            .await
            .context("Failed to parse coaching response")?;
        Ok(parsed.feedback)
    }
}

pub fn build_shot_request(shot: &ShotAnalysis) -> ShotFeedbackRequest {
    let request_id = format!(
        "{}_{}_t{:.0}",
        shot.shot_type.as_str().to_lowercase(),
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        shot.timestamp * 1000.0,
    );

    ShotFeedbackRequest {
        request_id,
        shot_type: shot.shot_type.as_str().to_string(),
        outcome: shot.outcome.as_str().to_string(),
        timestamp_s: shot.timestamp,
        duration_s: shot.duration,
        confidence: shot.confidence,
        arc_angle_degrees: shot.arc_angle,
        peak_height: shot.peak_height,
        release_point: shot.release_point,
        trajectory_points: shot.trajectory.len(),
        ball_speed: shot.trajectory.average_velocity().speed(),
        form: shot.form,
        heuristic_feedback: shot.feedback.clone(),
    }
}

pub fn build_session_request(shots: &[ShotAnalysis]) -> SessionSummaryRequest {
    SessionSummaryRequest {
        request_id: format!("session_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")),
        stats: SessionStats::from_shots(shots),
        shots: shots.iter().map(build_shot_request).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::shooting_form::tests::textbook_pose;
    use crate::analysis::shot_classifier::ShotClassifier;
    use crate::ball::{BallSighting, BallTrajectory};

    fn made_shot() -> ShotAnalysis {
        let trajectory = BallTrajectory::new(vec![
            BallSighting::new(0.0, 0.45, 0.70, 0.9),
            BallSighting::new(0.3, 0.48, 0.40, 0.9),
            BallSighting::new(0.6, 0.50, 0.20, 0.9),
            BallSighting::new(0.9, 0.50, 0.25, 0.9),
        ])
        .unwrap();
        ShotClassifier::default().classify(&trajectory, &textbook_pose(0.0), 0.9)
    }

    #[test]
    fn test_shot_request_carries_classification() {
        let shot = made_shot();
        let request = build_shot_request(&shot);

        assert_eq!(request.outcome, "MADE");
        assert_eq!(request.shot_type, shot.shot_type.as_str());
        assert_eq!(request.trajectory_points, 4);
        // Sightings built directly carry zero velocity
        assert_eq!(request.ball_speed, 0.0);
        assert_eq!(request.heuristic_feedback, shot.feedback);
        assert!(request.request_id.ends_with("_t900"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["form"]["follow_through"], 1.0);
    }

    #[test]
    fn test_session_request_includes_stats() {
        let shots = vec![made_shot(), made_shot()];
        let request = build_session_request(&shots);

        assert_eq!(request.stats.attempts, 2);
        assert_eq!(request.stats.made, 2);
        assert_eq!(request.shots.len(), 2);
        assert!(request.request_id.starts_with("session_"));
    }

    #[test]
    fn test_client_normalizes_server_url() {
        let client = CoachingClient::new(&CoachingConfig {
            server_url: "http://coach.local:3000/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.server_url, "http://coach.local:3000");
    }
}

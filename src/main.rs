// src/main.rs
//
// Replay runner: drives the frame processor over a recorded detection log
// and writes every classified shot to `{output_dir}/{stem}_shots.jsonl`.
//
// Usage: shot-tracker [config.yaml] [recording.jsonl]

use anyhow::{Context, Result};
use shot_tracker::coaching_client::CoachingClient;
use shot_tracker::types::FRAME_CHANNELS;
use shot_tracker::{
    CVError, Config, Frame, FrameProcessor, PipelineEvent, RecordedSession, SessionStats,
    ShotAnalysis,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .or_else(|| std::env::var("SHOT_TRACKER_CONFIG").ok())
        .unwrap_or_else(|| "config.yaml".to_string());

    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏀 Shot Tracker Starting");
    info!("✓ Configuration loaded from {}", config_path);
    info!(
        "Trigger: cooldown={:.1}s, min_points={}, rise>{:.2}, fall>{:.2}",
        config.shot.cooldown_s,
        config.shot.min_trajectory_points,
        config.shot.min_rise,
        config.shot.min_fall
    );

    let input_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.replay.input_path));

    let session = RecordedSession::load(&input_path)?;
    if session.is_empty() {
        error!("Recording {} holds no frames", input_path.display());
        return Ok(());
    }

    let coaching = if config.coaching.enabled {
        let client = CoachingClient::new(&config.coaching)?;
        info!("📡 Coaching server: {}", config.coaching.server_url);
        Some(client)
    } else {
        info!("⚪ Coaching feedback disabled in config");
        None
    };

    let shots = replay(&config, &session, &input_path, coaching.as_ref()).await?;

    let stats = SessionStats::from_shots(&shots);
    info!("\n========================================");
    info!("✓ Replay complete: {}", input_path.display());
    info!("  Shots detected: {}", stats.attempts);
    info!(
        "  Made: {} | Missed: {} | Unknown: {}",
        stats.made, stats.missed, stats.unknown
    );
    info!("  Field goal: {:.1}%", stats.field_goal_pct);
    for (shot_type, count) in &stats.by_type {
        info!("    {}: {}", shot_type, count);
    }
    if stats.attempts > 0 {
        info!(
            "  Avg arc: {:.1}° | avg confidence: {:.2} | avg form: {:.2}",
            stats.avg_arc_angle, stats.avg_confidence, stats.avg_form_score
        );
    }
    info!("========================================\n");

    if let Some(client) = &coaching {
        if !shots.is_empty() {
            match client.session_summary(&shots).await {
                Ok(summary) => info!("📝 Session summary: {}", summary),
                Err(e) => warn!("Session summary unavailable: {:#}", e),
            }
        }
    }

    Ok(())
}

async fn replay(
    config: &Config,
    session: &RecordedSession,
    input_path: &Path,
    coaching: Option<&CoachingClient>,
) -> Result<Vec<ShotAnalysis>> {
    let processor = FrameProcessor::new(
        config,
        Arc::new(session.pose_detector()),
        Arc::new(session.ball_detector()),
    );
    info!("✓ Frame processor ready");

    std::fs::create_dir_all(&config.replay.output_dir).with_context(|| {
        format!("Failed to create output dir {}", config.replay.output_dir)
    })?;
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    let jsonl_path = Path::new(&config.replay.output_dir).join(format!("{}_shots.jsonl", stem));
    let mut results_file = std::fs::File::create(&jsonl_path)
        .with_context(|| format!("Failed to create {}", jsonl_path.display()))?;
    info!("💾 Results will be written to: {}", jsonl_path.display());

    let (width, height) = (config.replay.frame_width, config.replay.frame_height);
    let frame_bytes = width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(FRAME_CHANNELS))
        .with_context(|| format!("Replay frame size {}x{} overflows", width, height))?;
    let blank: Arc<[u8]> = vec![0u8; frame_bytes].into();

    let mut shots = Vec::new();
    let mut skipped_frames: u64 = 0;

    for (index, recorded) in session.frames().iter().enumerate() {
        let frame = Frame::new(
            blank.clone(),
            width,
            height,
            index as u64,
            recorded.timestamp,
        );

        let result = match processor.process(&frame).await {
            Ok(result) => result,
            Err(CVError::ProcessingBusy) => {
                skipped_frames += 1;
                continue;
            }
            Err(e) => {
                warn!("Frame {} rejected: {}", index, e);
                skipped_frames += 1;
                continue;
            }
        };

        for event in processor.drain_events() {
            match event {
                PipelineEvent::ShotDetected(_) => {}
                PipelineEvent::TriggerWithoutPose { timestamp } => {
                    debug!("Arc at t={:.2}s had no matching pose", timestamp)
                }
                PipelineEvent::LatencyBreach {
                    frame_index,
                    latency_ms,
                } => debug!("Frame {} over budget: {:.1}ms", frame_index, latency_ms),
                PipelineEvent::DetectorFailed { detector, reason } => {
                    debug!("{} detector failed: {}", detector, reason)
                }
            }
        }

        if let Some(shot) = result.shot {
            save_shot(&shot, &mut results_file)?;

            if let Some(client) = coaching {
                match client.shot_feedback(&shot).await {
                    Ok(feedback) => info!("📝 Coach: {}", feedback),
                    Err(e) => warn!("Coaching feedback unavailable: {:#}", e),
                }
            }
            shots.push(shot);
        }

        if (index + 1) % 300 == 0 {
            info!(
                "Frame {}/{}: {} shot(s) so far",
                index + 1,
                session.len(),
                shots.len()
            );
        }
    }

    let metrics = processor.performance_metrics();
    info!(
        "Performance: {:.1}ms avg latency | {:.1} fps | {:.1} MB | {} frames | targets met: {}",
        metrics.avg_processing_time_ms,
        metrics.frame_rate,
        metrics.memory_usage_bytes as f64 / (1024.0 * 1024.0),
        metrics.frames_processed,
        metrics.within_targets()
    );
    if skipped_frames > 0 {
        warn!("{} frame(s) skipped", skipped_frames);
    }
    if processor.dropped_events() > 0 {
        warn!("{} pipeline event(s) dropped unread", processor.dropped_events());
    }

    Ok(shots)
}

fn save_shot(shot: &ShotAnalysis, file: &mut std::fs::File) -> Result<()> {
    let json_line = serde_json::to_string(shot)?;
    writeln!(file, "{}", json_line)?;
    Ok(())
}

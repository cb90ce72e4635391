// src/pipeline/frame_processor.rs
//
// Per-frame orchestrator. Single entry point: call process() each frame.
//
// Signal flow:
//   Frame → PoseDetector ─┐ (joined, order irrelevant)
//   Frame → BallDetector ─┴→ pose history / ball trajectory buffer
//                              → ShotTrigger → ShotClassifier → ShotAnalysis
//                              → PerformanceMonitor
//
// Only one frame is in flight at a time. A call that arrives while another
// is outstanding is rejected with ProcessingBusy, never queued; callers skip
// frames while busy. All tracking state is owned here and only mutated from
// inside process()/reset(); accessors hand out copies.

use super::event_bus::{EventBus, PipelineEvent, DEFAULT_MAX_PENDING};
use super::metrics::{PerformanceMetrics, PerformanceMonitor};
use crate::analysis::shot_classifier::ShotClassifier;
use crate::analysis::shot_trigger::{ShotTrigger, TriggerOutcome};
use crate::ball::{BallSighting, BallTrajectory};
use crate::detectors::{BallDetector, PoseDetector};
use crate::error::CVError;
use crate::history::{BallTrajectoryBuffer, PoseHistory};
use crate::pose::Pose;
use crate::shot::{FrameAnalysisResult, ShotAnalysis};
use crate::types::{Config, Frame};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

type DetectorResult<T> = Result<Option<T>, CVError>;

struct TrackingState {
    pose_history: PoseHistory,
    ball_history: BallTrajectoryBuffer,
    trigger: ShotTrigger,
    last_pose: Option<Pose>,
    last_ball: Option<BallSighting>,
    last_shot: Option<ShotAnalysis>,
    monitor: PerformanceMonitor,
    events: EventBus,
}

impl TrackingState {
    fn clear(&mut self) {
        self.pose_history.clear();
        self.ball_history.clear();
        self.trigger.reset();
        self.last_pose = None;
        self.last_ball = None;
        self.last_shot = None;
        self.monitor.reset();
        self.events.clear();
    }
}

/// Marks a frame as in flight; released on drop, including early returns.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct FrameProcessor {
    pose_detector: Arc<dyn PoseDetector>,
    ball_detector: Arc<dyn BallDetector>,
    classifier: ShotClassifier,
    pose_match_tolerance_s: f64,
    latency_target_ms: f64,
    detector_timeout: Option<Duration>,
    in_flight: AtomicBool,
    state: Mutex<TrackingState>,
}

impl FrameProcessor {
    pub fn new(
        config: &Config,
        pose_detector: Arc<dyn PoseDetector>,
        ball_detector: Arc<dyn BallDetector>,
    ) -> Self {
        let state = TrackingState {
            pose_history: PoseHistory::with_capacity(config.tracking.pose_history_capacity),
            ball_history: BallTrajectoryBuffer::with_capacity(
                config.tracking.ball_history_capacity,
            ),
            trigger: ShotTrigger::new(&config.shot),
            last_pose: None,
            last_ball: None,
            last_shot: None,
            monitor: PerformanceMonitor::new(config.performance.clone()),
            events: EventBus::new(DEFAULT_MAX_PENDING),
        };

        Self {
            pose_detector,
            ball_detector,
            classifier: ShotClassifier::new(config.shot.clone(), config.tracking.shooting_hand),
            pose_match_tolerance_s: config.tracking.pose_match_tolerance_s,
            latency_target_ms: config.performance.latency_target_ms,
            detector_timeout: config.detectors.timeout_ms.map(Duration::from_millis),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(state),
        }
    }

    /// Run both detectors on `frame`, update the windows, and classify any
    /// shot that just completed.
    pub async fn process(&self, frame: &Frame) -> Result<FrameAnalysisResult, CVError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(CVError::ProcessingBusy)?;
        let started = Instant::now();

        frame.validate()?;

        let (pose_result, ball_result) = tokio::join!(
            with_deadline("pose", self.detector_timeout, self.pose_detector.detect(frame)),
            with_deadline("ball", self.detector_timeout, self.ball_detector.detect(frame)),
        );

        Ok(self.absorb(frame, pose_result, ball_result, started))
    }

    fn absorb(
        &self,
        frame: &Frame,
        pose_result: DetectorResult<Pose>,
        ball_result: DetectorResult<BallSighting>,
        started: Instant,
    ) -> FrameAnalysisResult {
        let mut state = self.lock_state();

        let pose = accept_detection(&mut state.events, "pose", pose_result);
        let ball = accept_detection(&mut state.events, "ball", ball_result);

        if let Some(pose) = &pose {
            state.pose_history.push(pose.clone());
            state.monitor.set_last_pose_confidence(pose.confidence);
            state.last_pose = Some(pose.clone());
        }

        let ball = ball.map(|sighting| state.ball_history.push(sighting));
        if ball.is_some() {
            state.last_ball = ball;
        }

        let shot = self.detect_shot(&mut state, frame.timestamp);

        let latency = started.elapsed();
        let latency_ms = latency.as_secs_f64() * 1000.0;
        state.monitor.record(latency, Instant::now());

        if latency_ms > self.latency_target_ms {
            warn!(
                "Frame {} took {:.1}ms (target {:.0}ms)",
                frame.index, latency_ms, self.latency_target_ms
            );
            state.events.publish(PipelineEvent::LatencyBreach {
                frame_index: frame.index,
                latency_ms,
            });
        }

        FrameAnalysisResult {
            frame_index: frame.index,
            pose,
            ball,
            shot,
            processing_time_ms: latency_ms,
        }
    }

    fn detect_shot(&self, state: &mut TrackingState, now: f64) -> Option<ShotAnalysis> {
        let window = state.ball_history.trajectory()?;
        let trajectory = BallTrajectory::new(state.trigger.unconsumed(&window).to_vec())?;

        match state.trigger.check(&window, now) {
            Ok(TriggerOutcome::Triggered) => {}
            Ok(TriggerOutcome::CoolingDown { remaining_s }) => {
                debug!("Arc at {:.2}s suppressed: cooldown {:.2}s left", now, remaining_s);
                return None;
            }
            Ok(TriggerOutcome::NoArc) | Err(_) => return None,
        }

        let Some(pose) = state
            .pose_history
            .nearest_to(trajectory.start_time, self.pose_match_tolerance_s)
        else {
            debug!(
                "Shot triggered at {:.2}s but no pose within {:.1}s of release ({:.2}s)",
                now, self.pose_match_tolerance_s, trajectory.start_time
            );
            state
                .events
                .publish(PipelineEvent::TriggerWithoutPose { timestamp: now });
            return None;
        };

        let shot = self.classifier.classify(&trajectory, pose, now);
        info!(
            "🏀 {} {} at {:.2}s | arc {:.1}° | form {:.2} | conf {:.2}",
            shot.shot_type.as_str(),
            shot.outcome.as_str(),
            now,
            shot.arc_angle,
            shot.form.overall,
            shot.confidence
        );

        state.last_shot = Some(shot.clone());
        state.events.publish(PipelineEvent::ShotDetected(shot.clone()));
        Some(shot)
    }

    /// Clear all tracking state for a new session. Safe to call repeatedly.
    pub fn reset(&self) {
        self.lock_state().clear();
        info!("Tracking state reset");
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn last_pose(&self) -> Option<Pose> {
        self.lock_state().last_pose.clone()
    }

    pub fn last_ball(&self) -> Option<BallSighting> {
        self.lock_state().last_ball
    }

    pub fn last_shot(&self) -> Option<ShotAnalysis> {
        self.lock_state().last_shot.clone()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.lock_state().monitor.metrics()
    }

    pub fn last_shot_time(&self) -> Option<f64> {
        self.lock_state().trigger.last_shot_time()
    }

    pub fn pose_history(&self) -> Vec<Pose> {
        self.lock_state().pose_history.snapshot()
    }

    pub fn pose_history_len(&self) -> usize {
        self.lock_state().pose_history.len()
    }

    pub fn ball_trajectory(&self) -> Option<BallTrajectory> {
        self.lock_state().ball_history.trajectory()
    }

    pub fn ball_history_len(&self) -> usize {
        self.lock_state().ball_history.len()
    }

    pub fn drain_events(&self) -> Vec<PipelineEvent> {
        self.lock_state().events.drain()
    }

    /// Events lost to queue overflow since the last reset.
    pub fn dropped_events(&self) -> u64 {
        self.lock_state().events.dropped()
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackingState> {
        // State is only ever left consistent between statements, so a
        // poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn with_deadline<T, F>(
    detector: &'static str,
    deadline: Option<Duration>,
    detection: F,
) -> DetectorResult<T>
where
    F: Future<Output = DetectorResult<T>>,
{
    let Some(limit) = deadline else {
        return detection.await;
    };
    match tokio::time::timeout(limit, detection).await {
        Ok(result) => result,
        Err(_) => Err(CVError::DetectorTimeout {
            detector,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

/// A failed detector contributes no sample; the frame carries on.
fn accept_detection<T>(
    events: &mut EventBus,
    detector: &'static str,
    result: DetectorResult<T>,
) -> Option<T> {
    match result {
        Ok(detection) => detection,
        Err(e) => {
            warn!("⚠️  {} detector failed: {}", detector, e);
            events.publish(PipelineEvent::DetectorFailed {
                detector,
                reason: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::shooting_form::tests::textbook_pose;
    use crate::analysis::shot_trigger::tests::arc_sightings;
    use crate::detectors::{RecordedBall, RecordedFrame, RecordedSession};
    use crate::shot::{ShotOutcome, ShotType};
    use crate::types::FRAME_CHANNELS;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn blank_frame(index: u64, timestamp: f64) -> Frame {
        Frame::new(
            vec![0u8; 4 * 4 * FRAME_CHANNELS].into(),
            4,
            4,
            index,
            timestamp,
        )
    }

    /// One shot arc over 30 frames; a textbook pose on the release frame only.
    fn arc_session(with_pose: bool) -> RecordedSession {
        let frames = arc_sightings(0.0, 30)
            .into_iter()
            .enumerate()
            .map(|(i, s)| RecordedFrame {
                timestamp: s.timestamp,
                pose: (with_pose && i == 0).then(|| textbook_pose(s.timestamp)),
                ball: Some(RecordedBall {
                    x: s.position.x,
                    y: s.position.y,
                    confidence: s.confidence,
                }),
            })
            .collect();
        RecordedSession::new(frames)
    }

    fn processor_for(session: &RecordedSession, config: &Config) -> FrameProcessor {
        FrameProcessor::new(
            config,
            Arc::new(session.pose_detector()),
            Arc::new(session.ball_detector()),
        )
    }

    async fn replay(processor: &FrameProcessor, session: &RecordedSession) -> Vec<FrameAnalysisResult> {
        let mut results = Vec::new();
        for (i, recorded) in session.frames().iter().enumerate() {
            let frame = blank_frame(i as u64, recorded.timestamp);
            results.push(processor.process(&frame).await.unwrap());
        }
        results
    }

    struct FailingPoseDetector;

    #[async_trait]
    impl PoseDetector for FailingPoseDetector {
        async fn detect(&self, _frame: &Frame) -> Result<Option<Pose>, CVError> {
            Err(CVError::PoseDetectionFailed("model not loaded".to_string()))
        }
    }

    struct GatedPoseDetector {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl PoseDetector for GatedPoseDetector {
        async fn detect(&self, _frame: &Frame) -> Result<Option<Pose>, CVError> {
            self.gate.notified().await;
            Ok(None)
        }
    }

    struct SlowPoseDetector;

    #[async_trait]
    impl PoseDetector for SlowPoseDetector {
        async fn detect(&self, frame: &Frame) -> Result<Option<Pose>, CVError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(Pose::new(frame.timestamp, 0.9)))
        }
    }

    #[tokio::test]
    async fn test_single_shot_detected_and_classified() {
        let session = arc_session(true);
        let processor = processor_for(&session, &Config::default());

        let results = replay(&processor, &session).await;
        let shots: Vec<_> = results.iter().filter_map(|r| r.shot.as_ref()).collect();

        // Fires on frame 20, the first frame 0.05 below the peak; the rest
        // of the session sits inside the cooldown.
        assert_eq!(shots.len(), 1);
        assert!(results[20].shot.is_some());

        let shot = shots[0];
        assert_eq!(shot.shot_type, ShotType::Layup);
        assert_eq!(shot.outcome, ShotOutcome::Made);
        assert_eq!(shot.trajectory.len(), 21);
        assert!((0.0..=1.0).contains(&shot.confidence));
        assert!((shot.form.overall - 1.0).abs() < 1e-5);

        assert_eq!(processor.last_shot().as_ref(), Some(shot));
        assert_eq!(processor.last_shot_time(), Some(results[20].shot.as_ref().unwrap().timestamp));

        let events = processor.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, PipelineEvent::ShotDetected(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_arc_left_in_window_is_classified_once() {
        // Arc, then the ball rests at release height for three seconds with
        // the shooter in frame throughout.
        let mut frames: Vec<RecordedFrame> = arc_sightings(0.0, 30)
            .into_iter()
            .map(|s| RecordedFrame {
                timestamp: s.timestamp,
                pose: Some(textbook_pose(s.timestamp)),
                ball: Some(RecordedBall {
                    x: s.position.x,
                    y: s.position.y,
                    confidence: s.confidence,
                }),
            })
            .collect();
        frames.extend((30..120).map(|i| {
            let t = i as f64 / 30.0;
            RecordedFrame {
                timestamp: t,
                pose: Some(textbook_pose(t)),
                ball: Some(RecordedBall {
                    x: 0.6,
                    y: 0.85,
                    confidence: 0.9,
                }),
            }
        }));
        let session = RecordedSession::new(frames);
        let processor = processor_for(&session, &Config::default());

        let results = replay(&processor, &session).await;
        let shot_frames: Vec<u64> = results
            .iter()
            .filter(|r| r.shot.is_some())
            .map(|r| r.frame_index)
            .collect();

        assert_eq!(shot_frames, vec![20]);
    }

    #[tokio::test]
    async fn test_trigger_without_pose_emits_nothing_but_starts_cooldown() {
        let session = arc_session(false);
        let processor = processor_for(&session, &Config::default());

        let results = replay(&processor, &session).await;

        assert!(results.iter().all(|r| r.shot.is_none()));
        assert!(processor.last_shot().is_none());
        assert!(processor.last_shot_time().is_some());
        assert!(processor
            .drain_events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::TriggerWithoutPose { .. })));
    }

    #[tokio::test]
    async fn test_pose_history_bounded_through_processor() {
        let frames = (0..150)
            .map(|i| {
                let t = i as f64 / 30.0;
                RecordedFrame {
                    timestamp: t,
                    pose: Some(Pose::new(t, 0.8)),
                    ball: None,
                }
            })
            .collect();
        let session = RecordedSession::new(frames);
        let processor = processor_for(&session, &Config::default());

        replay(&processor, &session).await;

        let history = processor.pose_history();
        assert_eq!(history.len(), 120);
        assert_eq!(history[0].timestamp, 30.0 / 30.0);
        assert_eq!(history[119].timestamp, 149.0 / 30.0);
        assert_eq!(processor.performance_metrics().last_pose_confidence, 0.8);
    }

    #[tokio::test]
    async fn test_detector_failure_is_local_to_that_detector() {
        let session = arc_session(true);
        let processor = FrameProcessor::new(
            &Config::default(),
            Arc::new(FailingPoseDetector),
            Arc::new(session.ball_detector()),
        );

        let result = processor.process(&blank_frame(0, 0.0)).await.unwrap();

        assert!(result.pose.is_none());
        assert!(result.ball.is_some());
        assert_eq!(processor.pose_history_len(), 0);
        assert_eq!(processor.ball_history_len(), 1);
        assert!(processor
            .drain_events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::DetectorFailed { detector: "pose", .. })));
    }

    #[tokio::test]
    async fn test_detector_deadline_drops_slow_pose() {
        let session = arc_session(true);
        let mut config = Config::default();
        config.detectors.timeout_ms = Some(20);
        let processor = FrameProcessor::new(
            &config,
            Arc::new(SlowPoseDetector),
            Arc::new(session.ball_detector()),
        );

        let result = processor.process(&blank_frame(0, 0.0)).await.unwrap();

        assert!(result.pose.is_none());
        assert!(result.ball.is_some());
        assert!(result.processing_time_ms < 5000.0);
    }

    #[tokio::test]
    async fn test_invalid_frame_rejected_without_touching_state() {
        let session = arc_session(true);
        let processor = processor_for(&session, &Config::default());

        let bad = Frame::new(vec![0u8; 3].into(), 4, 4, 0, 0.0);
        let err = processor.process(&bad).await.unwrap_err();

        assert!(matches!(err, CVError::InvalidFrame(_)));
        assert_eq!(processor.ball_history_len(), 0);
        assert!(!processor.is_busy());
    }

    #[tokio::test]
    async fn test_concurrent_call_rejected_while_busy() {
        let session = arc_session(true);
        let gate = Arc::new(Notify::new());
        let processor = Arc::new(FrameProcessor::new(
            &Config::default(),
            Arc::new(GatedPoseDetector { gate: gate.clone() }),
            Arc::new(session.ball_detector()),
        ));

        let first = {
            let processor = processor.clone();
            tokio::spawn(async move { processor.process(&blank_frame(0, 0.0)).await })
        };
        while !processor.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = processor.process(&blank_frame(1, 1.0 / 30.0)).await;
        assert_eq!(second.unwrap_err(), CVError::ProcessingBusy);
        assert_eq!(processor.ball_history_len(), 0);
        assert_eq!(processor.pose_history_len(), 0);

        gate.notify_one();
        let result = first.await.unwrap().unwrap();
        assert!(result.ball.is_some());
        assert!(!processor.is_busy());
        assert_eq!(processor.ball_history_len(), 1);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let session = arc_session(true);
        let processor = processor_for(&session, &Config::default());
        replay(&processor, &session).await;
        assert!(processor.last_shot().is_some());

        processor.reset();
        processor.reset();

        assert!(processor.last_pose().is_none());
        assert!(processor.last_ball().is_none());
        assert!(processor.last_shot().is_none());
        assert!(processor.last_shot_time().is_none());
        assert!(processor.ball_trajectory().is_none());
        assert_eq!(processor.pose_history_len(), 0);
        assert_eq!(processor.ball_history_len(), 0);
        assert!(processor.drain_events().is_empty());
        assert_eq!(processor.performance_metrics().frames_processed, 0);
        assert_eq!(processor.dropped_events(), 0);
    }

    #[tokio::test]
    async fn test_shot_after_reset_not_blocked_by_old_cooldown() {
        let session = arc_session(true);
        let processor = processor_for(&session, &Config::default());

        let first = replay(&processor, &session).await;
        processor.reset();
        let second = replay(&processor, &session).await;

        assert_eq!(first.iter().filter(|r| r.shot.is_some()).count(), 1);
        assert_eq!(second.iter().filter(|r| r.shot.is_some()).count(), 1);
    }
}

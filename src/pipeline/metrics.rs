// src/pipeline/metrics.rs
//
// Per-frame performance tracking: rolling-average latency over the last N
// frames, instantaneous frame rate from the gap between frames, and the
// process resident size sampled every few frames.

use crate::history::RingBuffer;
use crate::types::PerformanceConfig;
use serde::Serialize;
use std::time::{Duration, Instant};
use sysinfo::{Pid, System};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub avg_processing_time_ms: f64,
    pub frame_rate: f64,
    pub memory_usage_bytes: u64,
    pub last_pose_confidence: f32,
    pub frames_processed: u64,
    pub latency_target_ms: f64,
    pub min_frame_rate: f64,
}

impl PerformanceMetrics {
    pub fn within_targets(&self) -> bool {
        self.avg_processing_time_ms < self.latency_target_ms
            && self.frame_rate >= self.min_frame_rate
    }
}

/// Resident memory of this process.
struct MemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl MemorySampler {
    fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    fn sample(&mut self) -> Option<u64> {
        let pid = self.pid?;
        if !self.system.refresh_process(pid) {
            return None;
        }
        self.system.process(pid).map(|p| p.memory())
    }
}

pub struct PerformanceMonitor {
    config: PerformanceConfig,
    latencies_ms: RingBuffer<f64>,
    last_frame_at: Option<Instant>,
    frame_rate: f64,
    memory: MemorySampler,
    memory_usage_bytes: u64,
    last_pose_confidence: f32,
    frames_processed: u64,
}

impl PerformanceMonitor {
    pub fn new(config: PerformanceConfig) -> Self {
        Self {
            latencies_ms: RingBuffer::with_capacity(config.latency_window),
            config,
            last_frame_at: None,
            frame_rate: 0.0,
            memory: MemorySampler::new(),
            memory_usage_bytes: 0,
            last_pose_confidence: 0.0,
            frames_processed: 0,
        }
    }

    /// Record one finished frame. `at` is when the frame completed.
    pub fn record(&mut self, latency: Duration, at: Instant) {
        self.latencies_ms.push(latency.as_secs_f64() * 1000.0);

        if let Some(previous) = self.last_frame_at {
            let gap = at.saturating_duration_since(previous).as_secs_f64();
            self.frame_rate = if gap > 0.0 { 1.0 / gap } else { 0.0 };
        }
        self.last_frame_at = Some(at);
        self.frames_processed += 1;

        let interval = self.config.memory_sample_interval;
        if interval > 0 && (self.frames_processed == 1 || self.frames_processed % interval == 0) {
            if let Some(bytes) = self.memory.sample() {
                self.memory_usage_bytes = bytes;
                debug!("Resident memory: {:.1} MB", bytes as f64 / 1_048_576.0);
            }
        }
    }

    pub fn set_last_pose_confidence(&mut self, confidence: f32) {
        self.last_pose_confidence = confidence;
    }

    pub fn average_latency_ms(&self) -> f64 {
        if self.latencies_ms.is_empty() {
            return 0.0;
        }
        self.latencies_ms.iter().sum::<f64>() / self.latencies_ms.len() as f64
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics {
            avg_processing_time_ms: self.average_latency_ms(),
            frame_rate: self.frame_rate,
            memory_usage_bytes: self.memory_usage_bytes,
            last_pose_confidence: self.last_pose_confidence,
            frames_processed: self.frames_processed,
            latency_target_ms: self.config.latency_target_ms,
            min_frame_rate: self.config.min_frame_rate,
        }
    }

    pub fn reset(&mut self) {
        self.latencies_ms.clear();
        self.last_frame_at = None;
        self.frame_rate = 0.0;
        self.memory_usage_bytes = 0;
        self.last_pose_confidence = 0.0;
        self.frames_processed = 0;
    }
}

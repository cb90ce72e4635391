// src/pipeline/event_bus.rs
//
// Decoupled notifications for downstream consumers (UI, coaching client).
// The processor publishes; consumers drain between frames.

use crate::history::RingBuffer;
use crate::shot::ShotAnalysis;
use tracing::warn;

pub const DEFAULT_MAX_PENDING: usize = 64;

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ShotDetected(ShotAnalysis),

    /// An arc triggered but no pose was close enough in time to classify it.
    TriggerWithoutPose {
        timestamp: f64,
    },

    LatencyBreach {
        frame_index: u64,
        latency_ms: f64,
    },

    DetectorFailed {
        detector: &'static str,
        reason: String,
    },
}

impl PipelineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShotDetected(_) => "shot_detected",
            Self::TriggerWithoutPose { .. } => "trigger_without_pose",
            Self::LatencyBreach { .. } => "latency_breach",
            Self::DetectorFailed { .. } => "detector_failed",
        }
    }
}

/// Bounded FIFO; once full, each publish evicts the oldest pending event.
pub struct EventBus {
    pending: RingBuffer<PipelineEvent>,
    dropped: u64,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: RingBuffer::with_capacity(max_pending),
            dropped: 0,
        }
    }

    pub fn publish(&mut self, event: PipelineEvent) {
        if let Some(evicted) = self.pending.push(event) {
            self.dropped += 1;
            warn!(
                "Event queue at capacity ({}), dropped unread {}",
                self.pending.capacity(),
                evicted.kind()
            );
        }
    }

    pub fn drain(&mut self) -> Vec<PipelineEvent> {
        self.pending.drain()
    }

    /// Events evicted unread since the last clear.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_drops_oldest() {
        let mut bus = EventBus::new(2);
        for i in 0..3 {
            bus.publish(PipelineEvent::LatencyBreach {
                frame_index: i,
                latency_ms: 600.0,
            });
        }

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            PipelineEvent::LatencyBreach { frame_index: 1, .. }
        ));
        assert_eq!(bus.dropped(), 1);
        assert!(bus.drain().is_empty());

        bus.clear();
        assert_eq!(bus.dropped(), 0);
    }
}

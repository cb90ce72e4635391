// src/pipeline/mod.rs

pub mod event_bus;
pub mod frame_processor;
pub mod metrics;

pub use event_bus::{EventBus, PipelineEvent};
pub use frame_processor::FrameProcessor;
pub use metrics::{PerformanceMetrics, PerformanceMonitor};

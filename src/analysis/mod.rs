// src/analysis/mod.rs
//
// Shot detection pipeline stages.
//
// Signal flow:
//   Ball trajectory window → shot_trigger ─┐
//   Nearest pose           → shooting_form ┴→ shot_classifier → ShotAnalysis
//
// Orchestrated by pipeline::FrameProcessor.

pub mod shooting_form;
pub mod shot_classifier;
pub mod shot_trigger;
pub mod thresholds;

pub use shooting_form::{ShootingForm, ShootingFormScorer};
pub use shot_classifier::{arc_angle, shot_distance, ShotClassifier};
pub use shot_trigger::{ArcProfile, ShotTrigger, TriggerOutcome};
pub use thresholds::ShotThresholds;

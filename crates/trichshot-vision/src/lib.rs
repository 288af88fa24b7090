#![deny(unreachable_patterns)]
//! Real-time hand proximity detection.
//!
//! This crate provides:
//! - Camera discovery with external-first ordering
//! - Threaded frame capture with a latest-frame-wins handoff
//! - Frame-skip scheduling with an explicit, bounded result cache
//! - Proximity scoring of hand landmarks against a danger zone
//! - A debounced, watchdog-bounded alert state machine
//! - Lock-free session statistics

pub mod alert;
pub mod camera;
pub mod capture;
pub mod detection;
pub mod error;
pub mod frame;
pub mod infrastructure;
pub mod pipeline;
pub mod stats;

pub use alert::{AlertConfig, AlertController, AlertSignal};
pub use camera::{classify, CameraSelector, DeviceProbe, SystemProbe};
pub use capture::{CaptureDevice, CapturedImage, DeviceOpener, FrameSource};
#[cfg(feature = "opencv")]
pub use capture::OpenCvOpener;
pub use detection::{
    decide, evaluate, Decision, FrameScheduler, LandmarkProvider, NullLandmarkProvider,
    ProximityResult,
};
pub use error::{VisionError, VisionResult};
pub use frame::Frame;
pub use infrastructure::{CircuitBreaker, CircuitState};
pub use pipeline::{
    AlertSink, FrameOutcome, MonitorPipeline, PipelineConfig, PipelineTick, RunOutcome,
};
pub use stats::{SessionStats, StatEvent};

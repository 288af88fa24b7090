//! Shared data models for the TrichShot monitor.
//!
//! This crate provides Serde-serializable types for:
//! - Camera candidates and their classification
//! - Danger zone geometry
//! - Performance modes and capture settings
//! - Hand landmark sets
//! - Alert state and session statistics snapshots
//! - Session log events

pub mod alert;
pub mod camera;
pub mod landmarks;
pub mod performance;
pub mod session;
pub mod validation;
pub mod zone;

// Re-export common types
pub use alert::{AlertPhase, AlertSnapshot};
pub use camera::{CameraCandidate, CameraClass};
pub use landmarks::{Handedness, Keypoint, LandmarkSet, NormalizedRect, HAND_KEYPOINT_COUNT};
pub use performance::{
    PerformanceMode, PerformanceSettings, Resolution, MAX_FRAME_SKIP, MAX_TARGET_FPS,
};
pub use session::{format_hms, AlertLogEvent, MonitorStatus, SessionId, StatsSnapshot};
pub use validation::ValidationError;
pub use zone::DangerZone;

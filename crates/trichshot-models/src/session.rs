//! Session-level models: identifiers, statistics snapshots, log events and
//! monitor status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::camera::CameraCandidate;

/// Unique identifier for a monitoring session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatsSnapshot {
    /// Frames taken from the capture slot
    pub frames_captured: u64,
    /// Frames that ran inference
    pub frames_processed: u64,
    /// Frames that reused the cached landmarks
    pub frames_skipped: u64,
    /// Idle/Cooling -> Triggered transitions
    pub alerts_triggered: u64,
    /// Inference calls that failed or timed out
    pub inference_failures: u64,
    /// Session start (wall clock)
    pub started_at: DateTime<Utc>,
    /// Whole seconds since session start
    pub session_secs: u64,
}

impl StatsSnapshot {
    /// Session duration as `HH:MM:SS`.
    pub fn session_time(&self) -> String {
        format_hms(self.session_secs)
    }
}

/// Format a number of seconds as `HH:MM:SS`.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// One line of the session log, written when an alert fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AlertLogEvent {
    pub session_id: SessionId,
    /// Alert count within the session at the time of this event
    pub alert_number: u64,
    pub timestamp: DateTime<Utc>,
    /// Proximity score (0.0 - 1.0) at trigger time
    pub proximity_score: f64,
    /// Normalized vertical distance to the zone at trigger time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_distance_to_zone: Option<f64>,
    pub camera_index: Option<u32>,
    pub camera_name: Option<String>,
}

/// What the monitor is currently doing, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitorStatus {
    #[default]
    Stopped,
    /// Opening a camera
    Starting,
    /// Pipeline running against a camera
    Monitoring { camera: CameraCandidate },
    /// No usable camera; detection paused
    NoCamera,
}

impl MonitorStatus {
    pub fn label(&self) -> String {
        match self {
            MonitorStatus::Stopped => "Status: Stopped".to_string(),
            MonitorStatus::Starting => "Status: Starting".to_string(),
            MonitorStatus::Monitoring { camera } => {
                format!("Status: Monitoring Active (Camera {})", camera.index)
            }
            MonitorStatus::NoCamera => "Status: No camera".to_string(),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        matches!(self, MonitorStatus::Monitoring { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraClass;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(36000), "10:00:00");
    }

    #[test]
    fn test_status_labels() {
        let cam = CameraCandidate::new(2, "USB Camera", CameraClass::External);
        let status = MonitorStatus::Monitoring { camera: cam };
        assert_eq!(status.label(), "Status: Monitoring Active (Camera 2)");
        assert!(status.is_monitoring());
        assert!(!MonitorStatus::NoCamera.is_monitoring());
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_string(&MonitorStatus::NoCamera).unwrap();
        assert_eq!(json, r#"{"state":"no_camera"}"#);
    }

    #[test]
    fn test_session_id_roundtrip_string() {
        let id = SessionId::from_string("abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
        assert_ne!(SessionId::new(), SessionId::new());
    }
}

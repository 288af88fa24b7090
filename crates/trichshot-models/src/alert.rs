//! Alert state models shared between the pipeline and presentation.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the alert state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertPhase {
    /// Waiting for a hand to enter the zone
    #[default]
    Idle,
    /// Overlay visible
    Triggered,
    /// Overlay hidden, re-trigger suppressed until the debounce window passes
    Cooling,
}

impl AlertPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPhase::Idle => "idle",
            AlertPhase::Triggered => "triggered",
            AlertPhase::Cooling => "cooling",
        }
    }

    /// Whether the overlay should be shown in this phase.
    pub fn overlay_visible(&self) -> bool {
        matches!(self, AlertPhase::Triggered)
    }
}

impl fmt::Display for AlertPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view of the alert state for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct AlertSnapshot {
    pub phase: AlertPhase,
    /// Wall-clock time of the most recent trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<DateTime<Utc>>,
    /// Configured overlay duration
    pub duration_ms: u64,
    /// Number shown on the overlay (alerts so far this session)
    pub alert_number: u64,
}

impl AlertSnapshot {
    pub fn overlay_visible(&self) -> bool {
        self.phase.overlay_visible()
    }
}

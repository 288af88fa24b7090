//! Camera candidate models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::performance::Resolution;

/// How a camera was classified from its name and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CameraClass {
    /// Name matched an external/USB keyword.
    External,
    /// Name matched a built-in/laptop keyword.
    Integrated,
    /// Name unavailable or unmatched; ranked by device index.
    Unknown,
}

impl CameraClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraClass::External => "external",
            CameraClass::Integrated => "integrated",
            CameraClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CameraClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A camera discovered during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CameraCandidate {
    /// Device index (`/dev/videoN`)
    pub index: u32,
    /// Human-readable device name, "Unknown" when it could not be read
    pub display_name: String,
    /// Heuristic classification
    pub classification: CameraClass,
    /// Resolution delivered while probing, if the probe read a frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl CameraCandidate {
    pub fn new(index: u32, display_name: impl Into<String>, classification: CameraClass) -> Self {
        Self {
            index,
            display_name: display_name.into(),
            classification,
            resolution: None,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Preference rank, lower is better:
    /// External, then Unknown above index 0, then Integrated, then Unknown at index 0.
    pub fn rank(&self) -> u8 {
        match self.classification {
            CameraClass::External => 0,
            CameraClass::Unknown if self.index > 0 => 1,
            CameraClass::Integrated => 2,
            CameraClass::Unknown => 3,
        }
    }

    /// Whether this camera is considered external for display purposes.
    pub fn is_external_likely(&self) -> bool {
        self.rank() <= 1
    }

    /// One-line description used in diagnostics, e.g.
    /// `Camera 1: HD Pro Webcam C920 (external) - 640x480`.
    pub fn describe(&self) -> String {
        let resolution = self
            .resolution
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Camera {}: {} ({}) - {}",
            self.index, self.display_name, self.classification, resolution
        )
    }
}

impl fmt::Display for CameraCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, {})", self.display_name, self.index, self.classification)
    }
}

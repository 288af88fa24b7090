//! Performance mode definitions for the capture/inference loop.
//!
//! A performance mode is a named preset for how hard the monitor works:
//!
//! - `Low`: 320x240 @ 10 fps, inference every 4th frame
//! - `Balanced`: 640x480 @ 15 fps, inference every 3rd frame
//! - `High`: 800x600 @ 20 fps, inference every 2nd frame

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

/// Highest accepted target frame rate.
pub const MAX_TARGET_FPS: u32 = 120;

/// Highest accepted frame skip, also the ceiling for pressure-driven increases.
pub const MAX_FRAME_SKIP: u32 = 30;

/// Named performance preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    /// Weak hardware: small frames, sparse inference.
    Low,

    /// Default trade-off between latency and CPU.
    #[default]
    Balanced,

    /// Larger frames and denser inference.
    High,
}

impl PerformanceMode {
    /// All available performance modes.
    pub const ALL: &'static [PerformanceMode] = &[
        PerformanceMode::Low,
        PerformanceMode::Balanced,
        PerformanceMode::High,
    ];

    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceMode::Low => "low",
            PerformanceMode::Balanced => "balanced",
            PerformanceMode::High => "high",
        }
    }

    /// Returns a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            PerformanceMode::Low => "Low CPU usage, slower reaction",
            PerformanceMode::Balanced => "Balanced CPU usage and reaction time",
            PerformanceMode::High => "Fastest reaction, highest CPU usage",
        }
    }

    /// Capture and scheduling settings for this preset.
    pub fn settings(&self) -> PerformanceSettings {
        match self {
            PerformanceMode::Low => PerformanceSettings {
                resolution: Resolution::new(320, 240),
                target_fps: 10,
                frame_skip: 3,
            },
            PerformanceMode::Balanced => PerformanceSettings {
                resolution: Resolution::new(640, 480),
                target_fps: 15,
                frame_skip: 2,
            },
            PerformanceMode::High => PerformanceSettings {
                resolution: Resolution::new(800, 600),
                target_fps: 20,
                frame_skip: 1,
            },
        }
    }
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PerformanceMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(PerformanceMode::Low),
            "balanced" | "medium" => Ok(PerformanceMode::Balanced),
            "high" => Ok(PerformanceMode::High),
            _ => Err(ValidationError::UnknownPerformanceMode(s.to_string())),
        }
    }
}

/// Requested capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    /// Parse `WIDTHxHEIGHT`, e.g. `640x480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidResolution(s.to_string());
        let (w, h) = s
            .trim()
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
            .ok_or_else(invalid)?;
        let width: u32 = w.parse().map_err(|_| invalid())?;
        let height: u32 = h.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Effective capture/inference settings: a preset plus any overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceSettings {
    /// Resolution hint for the camera
    pub resolution: Resolution,
    /// Frame rate hint for the camera
    pub target_fps: u32,
    /// Frames between inference runs (0 = every frame)
    pub frame_skip: u32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        PerformanceMode::default().settings()
    }
}

impl From<PerformanceMode> for PerformanceSettings {
    fn from(mode: PerformanceMode) -> Self {
        mode.settings()
    }
}

impl PerformanceSettings {
    /// Replace the resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Replace the target frame rate.
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Replace the frame skip.
    pub fn with_frame_skip(mut self, frame_skip: u32) -> Self {
        self.frame_skip = frame_skip;
        self
    }

    /// Check every field is within its accepted range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(ValidationError::InvalidResolution(self.resolution.to_string()));
        }
        if self.target_fps == 0 || self.target_fps > MAX_TARGET_FPS {
            return Err(ValidationError::InvalidFps {
                value: self.target_fps,
                max: MAX_TARGET_FPS,
            });
        }
        if self.frame_skip > MAX_FRAME_SKIP {
            return Err(ValidationError::InvalidFrameSkip {
                value: self.frame_skip,
                max: MAX_FRAME_SKIP,
            });
        }
        Ok(())
    }

    /// Nominal interval between captured frames.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

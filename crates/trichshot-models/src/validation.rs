//! Validation errors for user-supplied configuration.

use thiserror::Error;

/// Reasons a configuration value is rejected before it reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Danger zone {field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Danger zone {low_name} ({low}) must be below {high_name} ({high})")]
    InvertedBounds {
        low_name: &'static str,
        low: f64,
        high_name: &'static str,
        high: f64,
    },

    #[error("Unknown performance mode: {0}")]
    UnknownPerformanceMode(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Target FPS must be between 1 and {max}, got {value}")]
    InvalidFps { value: u32, max: u32 },

    #[error("Frame skip must be at most {max}, got {value}")]
    InvalidFrameSkip { value: u32, max: u32 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },
}

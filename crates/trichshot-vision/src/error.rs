//! Error types for capture, inference and pipeline operations.

use thiserror::Error;
use trichshot_models::ValidationError;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur in the detection pipeline.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Camera {index} unavailable: {message}")]
    DeviceUnavailable { index: u32, message: String },

    #[error("Camera {index} stream ended")]
    EndOfStream { index: u32 },

    #[error("Landmark inference unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("No cached landmark result; inference has not run yet")]
    NoCachedResult,

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(#[from] ValidationError),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VisionError {
    /// Create a device failure error.
    pub fn device_unavailable(index: u32, message: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            index,
            message: message.into(),
        }
    }

    /// Create an inference failure error.
    pub fn inference_unavailable(message: impl Into<String>) -> Self {
        Self::InferenceUnavailable(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VisionError::DeviceUnavailable { .. } => "device_unavailable",
            VisionError::EndOfStream { .. } => "end_of_stream",
            VisionError::InferenceUnavailable(_) => "inference_unavailable",
            VisionError::NoCachedResult => "no_cached_result",
            VisionError::ConfigurationInvalid(_) => "configuration_invalid",
            VisionError::ResourceExhausted(_) => "resource_exhausted",
            VisionError::Timeout(_) => "timeout",
            VisionError::Io(_) => "io",
            VisionError::Internal(_) => "internal",
        }
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for VisionError {
    fn from(e: opencv::Error) -> Self {
        Self::Internal(format!("OpenCV: {}", e))
    }
}

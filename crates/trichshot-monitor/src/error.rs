//! Monitor error types.

use thiserror::Error;
use trichshot_models::ValidationError;
use trichshot_vision::VisionError;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("No usable camera found")]
    NoCamera,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    #[error("Session log error: {0}")]
    SessionLog(String),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl MonitorError {
    pub fn session_log(msg: impl Into<String>) -> Self {
        Self::SessionLog(msg.into())
    }

    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    /// Whether the error was a rejected setting (the previous setting stays).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MonitorError::InvalidConfiguration(_)
                | MonitorError::Vision(VisionError::ConfigurationInvalid(_))
        )
    }
}

//! Structured session logging utilities.
//!
//! Provides consistent, structured logging for monitoring sessions with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use trichshot_models::{CameraCandidate, SessionId};

/// Session logger for structured logging with consistent formatting.
///
/// Every line carries the session ID and, once one is open, the camera index.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    camera: Option<u32>,
}

impl SessionLogger {
    pub fn new(session_id: &SessionId) -> Self {
        Self {
            session_id: session_id.to_string(),
            camera: None,
        }
    }

    /// Attach the active camera to subsequent lines.
    pub fn with_camera(mut self, camera: &CameraCandidate) -> Self {
        self.camera = Some(camera.index);
        self
    }

    pub fn log_start(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            camera = ?self.camera,
            "Session started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            camera = ?self.camera,
            "Session: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            camera = ?self.camera,
            "Session warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            session_id = %self.session_id,
            camera = ?self.camera,
            "Session error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            camera = ?self.camera,
            "Session ended: {}", message
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn camera(&self) -> Option<u32> {
        self.camera
    }

    /// Create a tracing span for this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            camera = ?self.camera
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trichshot_models::CameraClass;

    #[test]
    fn test_session_logger_creation() {
        let session_id = SessionId::new();
        let logger = SessionLogger::new(&session_id);

        assert_eq!(logger.session_id(), session_id.to_string());
        assert_eq!(logger.camera(), None);
    }

    #[test]
    fn test_session_logger_with_camera() {
        let session_id = SessionId::from_string("session-123");
        let camera = CameraCandidate::new(2, "USB Camera", CameraClass::External);
        let logger = SessionLogger::new(&session_id).with_camera(&camera);

        assert_eq!(logger.session_id(), "session-123");
        assert_eq!(logger.camera(), Some(2));
    }
}

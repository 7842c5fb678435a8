//! Structured per-session logging.

use hoopshot_models::{SessionId, ShotDetectionResult};
use tracing::{error, info, warn, Span};

/// Logger carrying the session ID and input name on every event.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    source: String,
}

impl SessionLogger {
    /// # Arguments
    /// * `session_id` - Session the input is replayed into
    /// * `source` - Human-readable input name (usually the file name)
    pub fn new(session_id: &SessionId, source: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            source: source.to_string(),
        }
    }

    pub fn log_start(&self) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            "Session started"
        );
    }

    pub fn log_progress(&self, frame: u64, attempts: u32, makes: u32) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            frame,
            attempts,
            makes,
            "Session progress"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            source = %self.source,
            "Session warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            session_id = %self.session_id,
            source = %self.source,
            "Session failed: {}", message
        );
    }

    pub fn log_completion(&self, frames: u64, result: &ShotDetectionResult) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            frames,
            attempts = result.total_attempts,
            makes = result.total_makes,
            misses = result.total_misses(),
            percentage = result.shooting_percentage,
            "Session completed"
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Span wrapping all work for this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            source = %self.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_logger_creation() {
        let id = SessionId::from("game-7");
        let logger = SessionLogger::new(&id, "game-7.jsonl");

        assert_eq!(logger.session_id(), "game-7");
        assert_eq!(logger.source(), "game-7.jsonl");
    }

    #[test]
    fn test_logging_without_subscriber() {
        let logger = SessionLogger::new(&SessionId::new(), "clip.jsonl");
        let _guard = logger.create_span().entered();

        logger.log_start();
        logger.log_progress(100, 2, 1);
        logger.log_warning("dropped 3 detections");
        logger.log_completion(120, &ShotDetectionResult::empty());
    }
}

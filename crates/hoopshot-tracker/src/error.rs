//! Error types for shot tracking.

use thiserror::Error;

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors that can occur while tracking shots.
///
/// Missing hoop or ball estimates and unresolved attempts are not errors;
/// the tracker treats them as "no signal yet".
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Frame {frame} arrived after frame {last}; frame indices must be non-decreasing")]
    FrameOrder { frame: u64, last: u64 },

    #[error("Session misuse: {0}")]
    SessionMisuse(String),

    #[error("Invalid tracker config: {0}")]
    InvalidConfig(String),

    #[error("Detector failed: {0}")]
    Detector(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl TrackerError {
    /// Create a session misuse error.
    pub fn session_misuse(message: impl Into<String>) -> Self {
        Self::SessionMisuse(message.into())
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a detector failure error.
    pub fn detector_failed(message: impl Into<String>) -> Self {
        Self::Detector(message.into())
    }
}

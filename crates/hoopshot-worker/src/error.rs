//! Worker error types.

use std::path::PathBuf;

use hoopshot_tracker::TrackerError;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed detection log {path} at line {line}: {source}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the failure is confined to the input file that caused it.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WorkerError::MalformedLine { .. } | WorkerError::Tracker(TrackerError::FrameOrder { .. })
        )
    }
}

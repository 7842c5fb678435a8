//! Batch worker for the shot tracker.
//!
//! This crate provides:
//! - Environment-driven worker configuration
//! - Streaming replay of JSON Lines detection logs
//! - A bounded-concurrency executor writing one result per log
//! - Per-session structured logging

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod replay;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::{output_path, BatchExecutor, BatchReport, JobFailure, JobSummary};
pub use logging::SessionLogger;
pub use replay::{replay_log, DetectionLog, ReplaySummary};

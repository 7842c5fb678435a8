//! Streaming basketball shot tracking.
//!
//! This crate turns per-frame ball and hoop detections into shot attempts:
//! - Track buffers holding per-class observation history
//! - Causal position cleaning with bounded windows
//! - Geometric region tests against a rolling hoop estimate
//! - An up/down state machine segmenting attempts
//! - Make/miss classification at the rim line
//! - A ledger producing the shot summary contract
//!
//! Everything runs synchronously, one frame at a time, with memory bounded
//! by the cleaning windows rather than by video length.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod pipeline;
pub mod region;
pub mod scoring;
pub mod session;
pub mod state_machine;
pub mod track;


pub use cleaner::{BallCleaner, CleanReport, HoopCleaner, PositionCleaner, RejectReason};
pub use config::{
    BallCleanerConfig, HoopCleanerConfig, IngestConfig, RegionConfig, ScoringConfig,
    ShotTrackerConfig,
};
pub use error::{TrackerError, TrackerResult};
pub use ledger::ShotLedger;
pub use pipeline::{FrameDetector, ShotPipeline};
pub use region::{HoopEstimate, RegionClassifier};
pub use scoring::MakeMissClassifier;
pub use session::{FrameOutcome, RejectedDetection, SessionStats, ShotSession};
pub use state_machine::{ResolvedAttempt, ShotPhase, ShotState, ShotStateMachine};
pub use track::{DetectionRecord, TrackBuffer};

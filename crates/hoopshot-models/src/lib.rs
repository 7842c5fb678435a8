//! Shared data models for the basketball shot tracker.
//!
//! This crate provides Serde-serializable types for:
//! - Per-frame detector output (ball and hoop boxes with confidence)
//! - The shot summary contract returned to callers
//! - Session identifiers

pub mod detection;
pub mod session;
pub mod shot;

// Re-export common types
pub use detection::{
    DetectionError, FrameDetections, ObjectClass, PixelBox, RawDetection,
};
pub use session::SessionId;
pub use shot::{shooting_percentage, ShotDetectionResult, ShotEvent};

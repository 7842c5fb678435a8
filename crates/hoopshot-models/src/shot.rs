//! Shot summary contract.
//!
//! `ShotDetectionResult` is the only shape handed back to callers. It is an
//! owned value with no references into tracker state, so it can be cached,
//! serialized or sent across threads freely.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One finalized shot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShotEvent {
    /// Frame at which the attempt was finalized
    pub frame: u64,
    /// Whether the attempt was classified as a make
    pub is_make: bool,
    /// Running attempt count including this event
    pub attempts: u32,
    /// Running make count including this event
    pub makes: u32,
}

/// Summary of all shots detected in one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShotDetectionResult {
    pub total_attempts: u32,
    pub total_makes: u32,
    /// Percentage of makes, rounded to two decimals (0.0 with no attempts)
    pub shooting_percentage: f64,
    pub shot_events: Vec<ShotEvent>,
}

impl ShotDetectionResult {
    /// Result for a video in which no attempt was finalized.
    pub fn empty() -> Self {
        Self {
            total_attempts: 0,
            total_makes: 0,
            shooting_percentage: 0.0,
            shot_events: Vec::new(),
        }
    }

    /// Number of missed attempts.
    pub fn total_misses(&self) -> u32 {
        self.total_attempts - self.total_makes
    }
}

impl Default for ShotDetectionResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// `round(100 * makes / attempts, 2)`, or `0.0` when there are no attempts.
pub fn shooting_percentage(makes: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    let pct = makes as f64 / attempts as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

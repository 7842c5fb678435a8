//! Diagnostic counters for the tracker.
//!
//! Recording is a no-op until the host process installs a recorder (the
//! worker installs a Prometheus exporter).

use hoopshot_models::{DetectionError, ObjectClass};
use metrics::counter;

use crate::cleaner::RejectReason;

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_PROCESSED_TOTAL: &str = "hoopshot_frames_processed_total";
    pub const DETECTIONS_DROPPED_TOTAL: &str = "hoopshot_detections_dropped_total";
    pub const DETECTIONS_BELOW_FLOOR_TOTAL: &str = "hoopshot_detections_below_floor_total";
    pub const CLEANER_REJECTIONS_TOTAL: &str = "hoopshot_cleaner_rejections_total";
    pub const SHOT_ATTEMPTS_TOTAL: &str = "hoopshot_shot_attempts_total";
    pub const SHOT_MAKES_TOTAL: &str = "hoopshot_shot_makes_total";
}

pub fn record_frame() {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
}

/// Record a malformed detection that was dropped.
pub fn record_dropped_detection(error: &DetectionError) {
    let labels = [("reason", error.reason().to_string())];
    counter!(names::DETECTIONS_DROPPED_TOTAL, &labels).increment(1);
}

/// Record a well-formed detection below its class confidence floor.
pub fn record_below_floor(class: ObjectClass) {
    let labels = [("class", class.as_str().to_string())];
    counter!(names::DETECTIONS_BELOW_FLOOR_TOTAL, &labels).increment(1);
}

pub fn record_cleaner_rejection(class: ObjectClass, reason: RejectReason) {
    let labels = [
        ("class", class.as_str().to_string()),
        ("reason", reason.as_str().to_string()),
    ];
    counter!(names::CLEANER_REJECTIONS_TOTAL, &labels).increment(1);
}

/// Record a finalized attempt.
pub fn record_attempt(is_make: bool) {
    counter!(names::SHOT_ATTEMPTS_TOTAL).increment(1);
    if is_make {
        counter!(names::SHOT_MAKES_TOTAL).increment(1);
    }
}

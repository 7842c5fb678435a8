//! Configuration for the shot tracker.
//!
//! Every threshold here is a tuning parameter. The defaults reproduce the
//! behavior the tracker was calibrated with on broadcast and phone footage;
//! they are expressed relative to the hoop or ball box size wherever possible
//! so they survive changes in resolution and zoom.

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// Top-level tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTrackerConfig {
    /// Confidence floors applied before detections enter a track.
    pub ingest: IngestConfig,
    /// Ball track cleaning.
    pub ball_cleaner: BallCleanerConfig,
    /// Hoop track cleaning and estimation.
    pub hoop_cleaner: HoopCleanerConfig,
    /// Geometric regions around the hoop.
    pub region: RegionConfig,
    /// Make/miss decision.
    pub scoring: ScoringConfig,
    /// Resolved attempts are checked on every Nth processed frame.
    pub finalize_every_frames: u64,
}

impl Default for ShotTrackerConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            ball_cleaner: BallCleanerConfig::default(),
            hoop_cleaner: HoopCleanerConfig::default(),
            region: RegionConfig::default(),
            scoring: ScoringConfig::default(),
            finalize_every_frames: 10,
        }
    }
}

impl ShotTrackerConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> TrackerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the tracker cannot run with.
    pub fn validate(&self) -> TrackerResult<()> {
        if self.finalize_every_frames == 0 {
            return Err(TrackerError::invalid_config(
                "finalize_every_frames must be at least 1",
            ));
        }

        let ingest = &self.ingest;
        for (name, value) in [
            ("ingest.ball_min_confidence", ingest.ball_min_confidence),
            ("ingest.ball_near_hoop_min_confidence", ingest.ball_near_hoop_min_confidence),
            ("ingest.hoop_min_confidence", ingest.hoop_min_confidence),
            ("region.up_min_confidence", self.region.up_min_confidence),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(TrackerError::invalid_config(format!(
                    "{name} must be in [0, 1), got {value}"
                )));
            }
        }

        for (name, value) in [
            ("ball_cleaner.max_aspect_ratio", self.ball_cleaner.max_aspect_ratio),
            ("ball_cleaner.max_size_ratio", self.ball_cleaner.max_size_ratio),
            ("hoop_cleaner.max_aspect_ratio", self.hoop_cleaner.max_aspect_ratio),
            ("hoop_cleaner.max_size_ratio", self.hoop_cleaner.max_size_ratio),
        ] {
            if value < 1.0 {
                return Err(TrackerError::invalid_config(format!(
                    "{name} is a ratio and must be >= 1.0, got {value}"
                )));
            }
        }

        if self.ball_cleaner.window_frames == 0 {
            return Err(TrackerError::invalid_config(
                "ball_cleaner.window_frames must be at least 1",
            ));
        }
        if self.hoop_cleaner.max_records == 0 || self.hoop_cleaner.estimate_samples == 0 {
            return Err(TrackerError::invalid_config(
                "hoop_cleaner.max_records and estimate_samples must be at least 1",
            ));
        }
        if self.scoring.rim_half_width_factor <= 0.0 || self.scoring.rebound_margin_px < 0.0 {
            return Err(TrackerError::invalid_config(
                "scoring tolerances must be positive",
            ));
        }

        Ok(())
    }
}

/// Confidence floors applied by the detection adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Ball detections above this confidence are always kept.
    pub ball_min_confidence: f64,
    /// Relaxed ball floor inside the padded hoop region.
    pub ball_near_hoop_min_confidence: f64,
    /// Hoop detections must exceed this confidence.
    pub hoop_min_confidence: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            ball_min_confidence: 0.30,
            ball_near_hoop_min_confidence: 0.15,
            hoop_min_confidence: 0.50,
        }
    }
}

/// Ball track cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallCleanerConfig {
    /// Reject boxes whose long side exceeds the short side by this ratio.
    pub max_aspect_ratio: f64,
    /// Reject boxes whose diagonal differs from the window median by more than this ratio.
    pub max_size_ratio: f64,
    /// Settled records required before the median size check applies.
    pub min_size_samples: usize,
    /// Max distance from the predicted position, in multiples of the last box diagonal.
    pub max_jump_factor: f64,
    /// Jump check only applies when fewer than this many frames separate observations.
    pub jump_frame_gap: u64,
    /// Settled records older than this many frames are pruned.
    pub window_frames: u64,
}

impl Default for BallCleanerConfig {
    fn default() -> Self {
        Self {
            max_aspect_ratio: 1.4,
            max_size_ratio: 2.0,
            min_size_samples: 3,
            max_jump_factor: 4.0,
            jump_frame_gap: 5,
            window_frames: 30,
        }
    }
}

/// Hoop track cleaning and estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopCleanerConfig {
    pub max_aspect_ratio: f64,
    /// Max center shift between observations, in multiples of the previous diagonal.
    pub max_shift_factor: f64,
    /// Max diagonal change between observations (ratio).
    pub max_size_ratio: f64,
    pub jump_frame_gap: u64,
    /// Only this many recent hoop records are retained.
    pub max_records: usize,
    /// The hoop estimate averages this many of the most recent records.
    pub estimate_samples: usize,
}

impl Default for HoopCleanerConfig {
    fn default() -> Self {
        Self {
            max_aspect_ratio: 1.3,
            max_shift_factor: 0.5,
            max_size_ratio: 1.5,
            jump_frame_gap: 5,
            max_records: 25,
            estimate_samples: 5,
        }
    }
}

/// Regions around the hoop, in multiples of hoop width (`x`) and height (`y`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Half-width of the padded hoop region.
    pub hoop_region_x_factor: f64,
    /// Padding above the hoop center.
    pub hoop_region_above_factor: f64,
    /// Padding below the hoop center.
    pub hoop_region_below_factor: f64,
    /// Half-width of the "up" region; arcs can be wide before they descend.
    pub up_x_factor: f64,
    /// Top of the "up" region above the hoop center.
    pub up_top_factor: f64,
    /// Bottom of the "up" region above the hoop center (the rim margin).
    pub up_bottom_factor: f64,
    /// "Down" starts this far below the hoop center.
    pub down_factor: f64,
    /// Minimum ball confidence for an "up" observation.
    pub up_min_confidence: f64,
    /// How many frames back the region scans look.
    pub lookback_frames: u64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            hoop_region_x_factor: 1.0,
            hoop_region_above_factor: 1.0,
            hoop_region_below_factor: 0.5,
            up_x_factor: 4.0,
            up_top_factor: 2.0,
            up_bottom_factor: 0.5,
            down_factor: 0.5,
            up_min_confidence: 0.30,
            lookback_frames: 5,
        }
    }
}

/// Make/miss decision at the rim line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Half-width of the scoring window, in multiples of hoop width.
    /// Smaller than 0.5 to leave room for the ball radius.
    pub rim_half_width_factor: f64,
    /// Extra pixels on each side for balls that roll in off the rim.
    /// Off by default.
    pub rebound_margin_px: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rim_half_width_factor: 0.4,
            rebound_margin_px: 0.0,
        }
    }
}

//! Position cleaning for ball and hoop tracks.
//!
//! Cleaners are causal: each pending record is judged only against records
//! settled before it. A rejected record is discarded, never interpolated, so
//! the state machine downstream has to tolerate gaps.

use tracing::debug;

use crate::config::{BallCleanerConfig, HoopCleanerConfig};
use crate::metrics;
use crate::track::{DetectionRecord, TrackBuffer};

/// Why a cleaner discarded a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Box far from square.
    AspectRatio,
    /// Box size inconsistent with recent boxes.
    SizeOutlier,
    /// Position inconsistent with recent motion.
    Jump,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::AspectRatio => "aspect_ratio",
            RejectReason::SizeOutlier => "size_outlier",
            RejectReason::Jump => "jump",
        }
    }
}

/// Counts from one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub kept: usize,
    pub rejected: usize,
    pub pruned: usize,
}

/// Per-class track cleaning.
pub trait PositionCleaner {
    /// Judge a candidate against the settled history.
    fn check(&self, track: &TrackBuffer, candidate: &DetectionRecord) -> Option<RejectReason>;

    /// Drop settled records that fell out of the working window.
    fn prune(&self, track: &mut TrackBuffer, current_frame: u64) -> usize;

    /// Settle or discard every pending record, then prune.
    fn clean(&self, track: &mut TrackBuffer, current_frame: u64) -> CleanReport {
        let mut report = CleanReport::default();

        for candidate in track.take_pending() {
            match self.check(track, &candidate) {
                None => {
                    track.settle(candidate);
                    report.kept += 1;
                }
                Some(reason) => {
                    debug!(
                        class = %track.class(),
                        frame = candidate.frame_index,
                        x = candidate.x,
                        y = candidate.y,
                        reason = reason.as_str(),
                        "Discarding implausible observation"
                    );
                    metrics::record_cleaner_rejection(track.class(), reason);
                    report.rejected += 1;
                }
            }
        }

        report.pruned = self.prune(track, current_frame);
        report
    }
}

fn size_ratio(a: f64, b: f64) -> f64 {
    if a >= b {
        a / b
    } else {
        b / a
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Ball cleaner: small, fast, blurry object with frequent false positives.
#[derive(Debug, Clone, Default)]
pub struct BallCleaner {
    config: BallCleanerConfig,
}

impl BallCleaner {
    pub fn new(config: BallCleanerConfig) -> Self {
        Self { config }
    }

    /// Where the ball should be at `frame` if it kept its recent velocity.
    fn predict(track: &TrackBuffer, frame: u64) -> Option<(f64, f64)> {
        let last = track.last()?;
        let gap = frame.saturating_sub(last.frame_index) as f64;

        let (vx, vy) = match track.second_last() {
            Some(prev) if last.frame_index > prev.frame_index => {
                let dt = (last.frame_index - prev.frame_index) as f64;
                ((last.x - prev.x) / dt, (last.y - prev.y) / dt)
            }
            _ => (0.0, 0.0),
        };

        Some((last.x + vx * gap, last.y + vy * gap))
    }
}

impl PositionCleaner for BallCleaner {
    fn check(&self, track: &TrackBuffer, candidate: &DetectionRecord) -> Option<RejectReason> {
        let cfg = &self.config;

        if candidate.aspect_ratio() > cfg.max_aspect_ratio {
            return Some(RejectReason::AspectRatio);
        }

        if track.len() >= cfg.min_size_samples.max(1) {
            let mut diagonals: Vec<f64> = track.iter().map(DetectionRecord::diagonal).collect();
            if let Some(median) = median(&mut diagonals) {
                if size_ratio(candidate.diagonal(), median) > cfg.max_size_ratio {
                    return Some(RejectReason::SizeOutlier);
                }
            }
        }

        if let Some(last) = track.last() {
            let gap = candidate.frame_index.saturating_sub(last.frame_index);
            if gap < cfg.jump_frame_gap {
                if let Some((px, py)) = Self::predict(track, candidate.frame_index) {
                    let max_dist = cfg.max_jump_factor * last.diagonal();
                    if candidate.distance_to(px, py) > max_dist {
                        return Some(RejectReason::Jump);
                    }
                }
            }
        }

        None
    }

    fn prune(&self, track: &mut TrackBuffer, current_frame: u64) -> usize {
        track.prune_before(current_frame.saturating_sub(self.config.window_frames))
    }
}

/// Hoop cleaner: large and near-stationary, but the camera may pan or zoom.
#[derive(Debug, Clone, Default)]
pub struct HoopCleaner {
    config: HoopCleanerConfig,
}

impl HoopCleaner {
    pub fn new(config: HoopCleanerConfig) -> Self {
        Self { config }
    }
}

impl PositionCleaner for HoopCleaner {
    fn check(&self, track: &TrackBuffer, candidate: &DetectionRecord) -> Option<RejectReason> {
        let cfg = &self.config;

        if candidate.aspect_ratio() > cfg.max_aspect_ratio {
            return Some(RejectReason::AspectRatio);
        }

        let last = track.last()?;
        if candidate.frame_index.saturating_sub(last.frame_index) >= cfg.jump_frame_gap {
            return None;
        }

        if candidate.distance_to(last.x, last.y) > cfg.max_shift_factor * last.diagonal() {
            return Some(RejectReason::Jump);
        }
        if size_ratio(candidate.diagonal(), last.diagonal()) > cfg.max_size_ratio {
            return Some(RejectReason::SizeOutlier);
        }

        None
    }

    fn prune(&self, track: &mut TrackBuffer, _current_frame: u64) -> usize {
        track.truncate_front(self.config.max_records)
    }
}

//! Hoop estimate and geometric region predicates.
//!
//! All predicates are pure functions of a track snapshot and the current
//! [`HoopEstimate`]. Image coordinates grow downward, so "above the rim"
//! means a smaller `y`.

use crate::config::RegionConfig;
use crate::track::{DetectionRecord, TrackBuffer};

/// Current belief about where the hoop is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoopEstimate {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Frame of the newest hoop record the estimate is built from
    pub frame_index: u64,
}

impl HoopEstimate {
    pub fn new(center_x: f64, center_y: f64, width: f64, height: f64, frame_index: u64) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
            frame_index,
        }
    }

    /// Average the `samples` most recent settled hoop records.
    ///
    /// Returns `None` when the hoop track is empty; that is a normal state
    /// early in a video or after the hoop leaves the frame.
    pub fn from_track(track: &TrackBuffer, samples: usize) -> Option<Self> {
        let newest = track.last()?;
        let recent: Vec<&DetectionRecord> = track.iter().rev().take(samples.max(1)).collect();
        let n = recent.len() as f64;
        let mean = |f: fn(&DetectionRecord) -> f64| recent.iter().map(|r| f(r)).sum::<f64>() / n;

        Some(Self {
            center_x: mean(|r| r.x),
            center_y: mean(|r| r.y),
            width: mean(|r| r.width),
            height: mean(|r| r.height),
            frame_index: newest.frame_index,
        })
    }

    /// Vertical level of the rim (top edge of the hoop box).
    #[inline]
    pub fn rim_y(&self) -> f64 {
        self.center_y - 0.5 * self.height
    }
}

/// Geometric classifier for ball positions relative to the hoop.
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    config: RegionConfig,
}

impl RegionClassifier {
    pub fn new(config: RegionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Generously padded box around the hoop.
    ///
    /// Only used to relax the ball confidence floor where partially
    /// occluded balls near the net are common.
    pub fn in_hoop_region(&self, hoop: &HoopEstimate, x: f64, y: f64) -> bool {
        let half_w = self.config.hoop_region_x_factor * hoop.width;
        let x1 = hoop.center_x - half_w;
        let x2 = hoop.center_x + half_w;
        let y1 = hoop.center_y - self.config.hoop_region_above_factor * hoop.height;
        let y2 = hoop.center_y + self.config.hoop_region_below_factor * hoop.height;

        x1 < x && x < x2 && y1 < y && y < y2
    }

    /// Whether a single observation lies in the "up" band above the rim.
    pub fn is_up(&self, hoop: &HoopEstimate, record: &DetectionRecord) -> bool {
        let half_w = self.config.up_x_factor * hoop.width;
        let x1 = hoop.center_x - half_w;
        let x2 = hoop.center_x + half_w;
        let y1 = hoop.center_y - self.config.up_top_factor * hoop.height;
        let y2 = hoop.center_y - self.config.up_bottom_factor * hoop.height;

        record.confidence >= self.config.up_min_confidence
            && x1 < record.x
            && record.x < x2
            && y1 < record.y
            && record.y < y2
    }

    /// Whether a single observation lies below the hoop.
    pub fn is_down(&self, hoop: &HoopEstimate, record: &DetectionRecord) -> bool {
        record.y > hoop.center_y + self.config.down_factor * hoop.height
    }

    /// Newest recent ball observation above the rim.
    ///
    /// Scans the trailing lookback window (not only the latest record) and
    /// ignores observations at or before `after`. Returns the frame index of
    /// the matching observation.
    pub fn detect_up(
        &self,
        ball: &TrackBuffer,
        hoop: &HoopEstimate,
        current_frame: u64,
        after: Option<u64>,
    ) -> Option<u64> {
        ball.recent(current_frame, self.config.lookback_frames)
            .filter(|r| after.map_or(true, |floor| r.frame_index > floor))
            .find(|r| self.is_up(hoop, r))
            .map(|r| r.frame_index)
    }

    /// Newest recent ball observation below the hoop, observed after `after`.
    pub fn detect_down(
        &self,
        ball: &TrackBuffer,
        hoop: &HoopEstimate,
        current_frame: u64,
        after: Option<u64>,
    ) -> Option<u64> {
        ball.recent(current_frame, self.config.lookback_frames)
            .filter(|r| after.map_or(true, |floor| r.frame_index > floor))
            .find(|r| self.is_down(hoop, r))
            .map(|r| r.frame_index)
    }
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self::new(RegionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopshot_models::ObjectClass;

    // Hoop centered at (500, 300), 100 x 90.
    fn hoop() -> HoopEstimate {
        HoopEstimate::new(500.0, 300.0, 100.0, 90.0, 0)
    }

    fn ball(x: f64, y: f64, frame: u64) -> DetectionRecord {
        DetectionRecord::new(x, y, frame, 24.0, 24.0, 0.9)
    }

    fn track(records: &[DetectionRecord]) -> TrackBuffer {
        let mut t = TrackBuffer::new(ObjectClass::Ball);
        for r in records {
            t.settle(*r);
        }
        t
    }

    #[test]
    fn test_estimate_averages_recent_records() {
        let mut hoops = TrackBuffer::new(ObjectClass::Hoop);
        assert!(HoopEstimate::from_track(&hoops, 5).is_none());

        hoops.settle(DetectionRecord::new(100.0, 100.0, 0, 50.0, 50.0, 0.9));
        hoops.settle(DetectionRecord::new(490.0, 300.0, 1, 100.0, 90.0, 0.9));
        hoops.settle(DetectionRecord::new(510.0, 300.0, 2, 100.0, 90.0, 0.9));

        let est = HoopEstimate::from_track(&hoops, 2).unwrap();
        assert_eq!(est.center_x, 500.0);
        assert_eq!(est.width, 100.0);
        assert_eq!(est.frame_index, 2);
        assert_eq!(est.rim_y(), 255.0);
    }

    #[test]
    fn test_in_hoop_region() {
        let classifier = RegionClassifier::default();
        let hoop = hoop();

        assert!(classifier.in_hoop_region(&hoop, 500.0, 300.0));
        assert!(classifier.in_hoop_region(&hoop, 420.0, 220.0));
        assert!(!classifier.in_hoop_region(&hoop, 390.0, 300.0));
        assert!(!classifier.in_hoop_region(&hoop, 500.0, 200.0));
        assert!(!classifier.in_hoop_region(&hoop, 500.0, 350.0));
    }

    #[test]
    fn test_up_band_bounds() {
        let classifier = RegionClassifier::default();
        let hoop = hoop();

        // Up band: 100 < x < 900, 120 < y < 255.
        assert!(classifier.is_up(&hoop, &ball(500.0, 200.0, 0)));
        assert!(classifier.is_up(&hoop, &ball(150.0, 130.0, 0)));
        assert!(!classifier.is_up(&hoop, &ball(500.0, 260.0, 0)));
        assert!(!classifier.is_up(&hoop, &ball(500.0, 100.0, 0)));
        assert!(!classifier.is_up(&hoop, &ball(950.0, 200.0, 0)));

        let faint = DetectionRecord::new(500.0, 200.0, 0, 24.0, 24.0, 0.2);
        assert!(!classifier.is_up(&hoop, &faint));
    }

    #[test]
    fn test_detect_up_scans_trailing_window() {
        let classifier = RegionClassifier::default();
        let hoop = hoop();

        // The up observation is not the newest record.
        let t = track(&[ball(300.0, 400.0, 8), ball(480.0, 200.0, 9), ball(520.0, 270.0, 10)]);
        assert_eq!(classifier.detect_up(&t, &hoop, 10, None), Some(9));

        // Outside the lookback window.
        assert_eq!(classifier.detect_up(&t, &hoop, 20, None), None);

        // Already consumed.
        assert_eq!(classifier.detect_up(&t, &hoop, 10, Some(9)), None);
    }

    #[test]
    fn test_detect_down_requires_later_observation() {
        let classifier = RegionClassifier::default();
        let hoop = hoop();

        let t = track(&[ball(500.0, 380.0, 5), ball(480.0, 200.0, 7)]);
        assert_eq!(classifier.detect_down(&t, &hoop, 8, None), Some(5));
        assert_eq!(classifier.detect_down(&t, &hoop, 8, Some(7)), None);

        let t = track(&[ball(480.0, 200.0, 7), ball(520.0, 360.0, 9)]);
        assert_eq!(classifier.detect_down(&t, &hoop, 9, Some(7)), Some(9));
    }
}

//! Make/miss classification at the rim line.

use crate::config::ScoringConfig;
use crate::region::HoopEstimate;
use crate::state_machine::ResolvedAttempt;
use crate::track::TrackBuffer;

/// Decides whether a finalized attempt went in.
///
/// Only observations between the attempt's up and down frames are used.
/// The ball path is bracketed around the rim level using the newest of
/// those observations above the rim and the one that followed it, and the
/// horizontal crossing point is linearly interpolated between the two.
#[derive(Debug, Clone, Default)]
pub struct MakeMissClassifier {
    config: ScoringConfig,
}

impl MakeMissClassifier {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Interpolated x where the ball crosses the rim line during `attempt`.
    pub fn crossing_x(
        &self,
        ball: &TrackBuffer,
        hoop: &HoopEstimate,
        attempt: &ResolvedAttempt,
    ) -> Option<f64> {
        let rim_y = hoop.rim_y();
        let in_attempt: Vec<_> = ball
            .iter()
            .filter(|r| attempt.up_frame <= r.frame_index && r.frame_index <= attempt.down_frame)
            .collect();

        let above = in_attempt.iter().rposition(|r| r.y < rim_y)?;
        let a = in_attempt[above];
        let b = in_attempt.get(above + 1)?;

        // `b` is at or below the rim, so dy > 0.
        let dy = b.y - a.y;
        if dy <= 0.0 {
            return None;
        }
        Some(a.x + (rim_y - a.y) * (b.x - a.x) / dy)
    }

    /// Horizontal window counted as a make.
    pub fn scoring_window(&self, hoop: &HoopEstimate) -> (f64, f64) {
        let half = self.config.rim_half_width_factor * hoop.width + self.config.rebound_margin_px;
        (hoop.center_x - half, hoop.center_x + half)
    }

    /// Missing bracketing data counts as a miss.
    pub fn classify(&self, ball: &TrackBuffer, hoop: &HoopEstimate, attempt: &ResolvedAttempt) -> bool {
        let Some(x) = self.crossing_x(ball, hoop, attempt) else {
            return false;
        };
        let (left, right) = self.scoring_window(hoop);
        left < x && x < right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::DetectionRecord;
    use hoopshot_models::ObjectClass;

    fn hoop() -> HoopEstimate {
        // Rim at y = 255, scoring window (460, 540).
        HoopEstimate::new(500.0, 300.0, 100.0, 90.0, 0)
    }

    fn track(points: &[(f64, f64, u64)]) -> TrackBuffer {
        let mut t = TrackBuffer::new(ObjectClass::Ball);
        for &(x, y, f) in points {
            t.settle(DetectionRecord::new(x, y, f, 24.0, 24.0, 0.9));
        }
        t
    }

    fn attempt(up_frame: u64, down_frame: u64) -> ResolvedAttempt {
        ResolvedAttempt { up_frame, down_frame }
    }

    #[test]
    fn test_crossing_interpolates_between_bracketing_points() {
        let classifier = MakeMissClassifier::default();
        let t = track(&[(430.0, 195.0, 46), (470.0, 235.0, 50), (510.0, 275.0, 52), (550.0, 365.0, 56)]);
        let shot = attempt(46, 56);

        let x = classifier.crossing_x(&t, &hoop(), &shot).unwrap();
        assert!((x - 490.0).abs() < 1e-9);
        assert!(classifier.classify(&t, &hoop(), &shot));
    }

    #[test]
    fn test_crossing_outside_rim_is_miss() {
        let classifier = MakeMissClassifier::default();
        let t = track(&[(580.0, 235.0, 50), (620.0, 275.0, 52)]);
        let shot = attempt(50, 52);

        let x = classifier.crossing_x(&t, &hoop(), &shot).unwrap();
        assert!((x - 600.0).abs() < 1e-9);
        assert!(!classifier.classify(&t, &hoop(), &shot));
    }

    #[test]
    fn test_observations_outside_attempt_are_ignored() {
        let classifier = MakeMissClassifier::default();
        // Made shot between 40 and 52, then a stray detection above the rim at 58.
        let t = track(&[
            (470.0, 235.0, 48),
            (510.0, 290.0, 50),
            (530.0, 360.0, 52),
            (700.0, 200.0, 58),
        ]);

        assert!(classifier.classify(&t, &hoop(), &attempt(40, 52)));
        // Scored over the whole window, the stray record has no successor.
        assert!(!classifier.classify(&t, &hoop(), &attempt(40, 58)));
    }

    #[test]
    fn test_rebound_margin_is_opt_in() {
        // Crosses at x = 545: just outside 0.4 * width.
        let t = track(&[(545.0, 235.0, 50), (545.0, 275.0, 52)]);
        let shot = attempt(50, 52);
        assert!(!MakeMissClassifier::default().classify(&t, &hoop(), &shot));

        let lenient = MakeMissClassifier::new(ScoringConfig {
            rebound_margin_px: 10.0,
            ..Default::default()
        });
        assert_eq!(lenient.scoring_window(&hoop()), (450.0, 550.0));
        assert!(lenient.classify(&t, &hoop(), &shot));
    }

    #[test]
    fn test_insufficient_data_is_miss() {
        let classifier = MakeMissClassifier::default();
        let shot = attempt(0, 10);

        assert!(!classifier.classify(&track(&[]), &hoop(), &shot));
        // Only above the rim: nothing after it.
        assert!(!classifier.classify(&track(&[(500.0, 200.0, 1), (500.0, 220.0, 2)]), &hoop(), &shot));
        // Only below the rim.
        assert!(!classifier.classify(&track(&[(500.0, 300.0, 1), (500.0, 400.0, 2)]), &hoop(), &shot));
    }
}

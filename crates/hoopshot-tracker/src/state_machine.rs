//! Shot segmentation state machine.
//!
//! An attempt is one traversal of the ball from the band above the rim to
//! below the hoop. The machine only records *when* each side was observed;
//! finalizing (and the costlier trajectory fit) is batched onto a fixed
//! cadence of processed frames.
//!
//! ```text
//! Idle --detect_up--> Up --detect_down--> Resolved --checkpoint--> Idle
//!                      ^                     |
//!                      +--- ordering fails --+
//! ```

use tracing::debug;

use crate::region::{HoopEstimate, RegionClassifier};
use crate::track::TrackBuffer;

/// Coarse phase derived from the up/down flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    /// Neither side seen.
    Idle,
    /// Ball seen above the rim.
    Up,
    /// Ball seen above, then below.
    Resolved,
}

/// Per-session up/down flags.
///
/// `down` only becomes true while `up` is already true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotState {
    pub up: bool,
    pub down: bool,
    pub up_frame: u64,
    pub down_frame: u64,
}

impl ShotState {
    pub fn phase(&self) -> ShotPhase {
        match (self.up, self.down) {
            (true, true) => ShotPhase::Resolved,
            (true, false) => ShotPhase::Up,
            _ => ShotPhase::Idle,
        }
    }
}

/// An up→down traversal ready to be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAttempt {
    pub up_frame: u64,
    pub down_frame: u64,
}

/// Detects up→down traversals for one session.
#[derive(Debug, Clone)]
pub struct ShotStateMachine {
    state: ShotState,
    /// Observations at or before this frame belong to a finalized attempt.
    consumed_through: Option<u64>,
    frames_processed: u64,
    finalize_every: u64,
}

impl ShotStateMachine {
    pub fn new(finalize_every: u64) -> Self {
        Self {
            state: ShotState::default(),
            consumed_through: None,
            frames_processed: 0,
            finalize_every: finalize_every.max(1),
        }
    }

    pub fn state(&self) -> ShotState {
        self.state
    }

    pub fn phase(&self) -> ShotPhase {
        self.state.phase()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Record an "up" observation. Ignored unless the machine is idle.
    pub fn mark_up(&mut self, frame: u64) -> bool {
        if self.state.up {
            return false;
        }
        self.state.up = true;
        self.state.up_frame = frame;
        debug!(frame, "Ball above rim");
        true
    }

    /// Record a "down" observation. Ignored unless the machine is in `Up`.
    pub fn mark_down(&mut self, frame: u64) -> bool {
        if !self.state.up || self.state.down {
            return false;
        }
        self.state.down = true;
        self.state.down_frame = frame;
        debug!(frame, up_frame = self.state.up_frame, "Ball below hoop");
        true
    }

    /// Run the region predicates for the current frame.
    pub fn observe(
        &mut self,
        ball: &TrackBuffer,
        hoop: &HoopEstimate,
        current_frame: u64,
        regions: &RegionClassifier,
    ) {
        if !self.state.up {
            if let Some(frame) = regions.detect_up(ball, hoop, current_frame, self.consumed_through) {
                self.mark_up(frame);
            }
        }

        if self.state.up && !self.state.down {
            let after = Some(self.state.up_frame);
            if let Some(frame) = regions.detect_down(ball, hoop, current_frame, after) {
                self.mark_down(frame);
            }
        }
    }

    /// Whether the current frame is a finalize checkpoint.
    pub fn is_checkpoint(&self) -> bool {
        self.frames_processed % self.finalize_every == 0
    }

    /// Take a resolved attempt, resetting to `Idle`.
    ///
    /// A `down` that does not come after the `up` is discarded and the
    /// machine goes back to waiting for a real `down`.
    pub fn take_resolved(&mut self) -> Option<ResolvedAttempt> {
        if self.state.phase() != ShotPhase::Resolved {
            return None;
        }

        if self.state.up_frame >= self.state.down_frame {
            debug!(
                up_frame = self.state.up_frame,
                down_frame = self.state.down_frame,
                "Discarding down observed before up"
            );
            self.state.down = false;
            self.state.down_frame = 0;
            return None;
        }

        let attempt = ResolvedAttempt {
            up_frame: self.state.up_frame,
            down_frame: self.state.down_frame,
        };
        self.state = ShotState::default();
        self.consumed_through = Some(attempt.down_frame);
        Some(attempt)
    }

    /// Count the current frame as processed.
    pub fn advance_frame(&mut self) {
        self.frames_processed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::DetectionRecord;
    use hoopshot_models::ObjectClass;

    fn hoop() -> HoopEstimate {
        HoopEstimate::new(500.0, 300.0, 100.0, 90.0, 0)
    }

    fn settle(track: &mut TrackBuffer, x: f64, y: f64, frame: u64) {
        track.settle(DetectionRecord::new(x, y, frame, 24.0, 24.0, 0.9));
    }

    #[test]
    fn test_phases() {
        let mut sm = ShotStateMachine::new(10);
        assert_eq!(sm.phase(), ShotPhase::Idle);

        // Down before up is ignored.
        assert!(!sm.mark_down(3));
        assert_eq!(sm.phase(), ShotPhase::Idle);

        assert!(sm.mark_up(5));
        assert_eq!(sm.phase(), ShotPhase::Up);
        assert!(!sm.mark_up(6));
        assert_eq!(sm.state().up_frame, 5);

        assert!(sm.mark_down(9));
        assert_eq!(sm.phase(), ShotPhase::Resolved);
        assert!(!sm.mark_down(12));

        let attempt = sm.take_resolved().unwrap();
        assert_eq!(attempt, ResolvedAttempt { up_frame: 5, down_frame: 9 });
        assert_eq!(sm.phase(), ShotPhase::Idle);
    }

    #[test]
    fn test_down_before_up_never_finalizes() {
        let mut sm = ShotStateMachine::new(10);
        sm.mark_up(80);
        sm.mark_down(70);

        assert_eq!(sm.take_resolved(), None);
        assert_eq!(sm.phase(), ShotPhase::Up);

        // A genuine later down still resolves the attempt.
        sm.mark_down(90);
        assert!(sm.take_resolved().is_some());
    }

    #[test]
    fn test_checkpoint_cadence() {
        let mut sm = ShotStateMachine::new(10);
        let mut checkpoints = Vec::new();
        for frame in 0..25 {
            if sm.is_checkpoint() {
                checkpoints.push(frame);
            }
            sm.advance_frame();
        }
        assert_eq!(checkpoints, vec![0, 10, 20]);
    }

    #[test]
    fn test_observe_tracks_traversal() {
        let regions = RegionClassifier::default();
        let hoop = hoop();
        let mut ball = TrackBuffer::new(ObjectClass::Ball);
        let mut sm = ShotStateMachine::new(10);

        settle(&mut ball, 400.0, 200.0, 10);
        sm.observe(&ball, &hoop, 10, &regions);
        assert_eq!(sm.phase(), ShotPhase::Up);

        settle(&mut ball, 500.0, 380.0, 14);
        sm.observe(&ball, &hoop, 14, &regions);
        assert_eq!(sm.phase(), ShotPhase::Resolved);
        assert_eq!(sm.state().down_frame, 14);

        sm.take_resolved().unwrap();

        // The consumed up observation cannot start a new attempt.
        sm.observe(&ball, &hoop, 14, &regions);
        assert_eq!(sm.phase(), ShotPhase::Idle);
    }
}

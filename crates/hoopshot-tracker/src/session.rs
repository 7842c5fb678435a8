//! Per-video tracking session.
//!
//! A session owns every piece of mutable state for one video: both track
//! buffers, the shot state machine and the ledger. Frames are processed
//! strictly one at a time; after any frame the ledger is a valid partial
//! result.

use hoopshot_models::{
    DetectionError, FrameDetections, ObjectClass, RawDetection, SessionId, ShotDetectionResult,
    ShotEvent,
};
use tracing::{debug, info, warn};

use crate::cleaner::{BallCleaner, HoopCleaner, PositionCleaner};
use crate::config::{IngestConfig, ShotTrackerConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::ledger::ShotLedger;
use crate::metrics;
use crate::region::{HoopEstimate, RegionClassifier};
use crate::scoring::MakeMissClassifier;
use crate::state_machine::{ShotPhase, ShotStateMachine};
use crate::track::{DetectionRecord, TrackBuffer};

/// A detection dropped because it was malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedDetection {
    /// Position of the detection within its frame
    pub index: usize,
    pub class: ObjectClass,
    pub error: DetectionError,
}

/// What happened while processing one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub frame_index: u64,
    /// Attempts finalized on this frame (at most one in practice)
    pub events: Vec<ShotEvent>,
    /// Malformed detections dropped from this frame
    pub rejected: Vec<RejectedDetection>,
}

/// Running diagnostics for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_processed: u64,
    pub detections_seen: u64,
    pub malformed_dropped: u64,
    pub below_floor: u64,
    pub cleaner_rejected: u64,
}

/// Exclusive state for one video.
#[derive(Debug, Clone)]
pub struct ShotSession {
    id: SessionId,
    ingest: IngestConfig,
    hoop_estimate_samples: usize,
    ball_track: TrackBuffer,
    hoop_track: TrackBuffer,
    ball_cleaner: BallCleaner,
    hoop_cleaner: HoopCleaner,
    regions: RegionClassifier,
    scorer: MakeMissClassifier,
    machine: ShotStateMachine,
    ledger: ShotLedger,
    last_frame: Option<u64>,
    stats: SessionStats,
}

impl ShotSession {
    /// Start a fresh session. The config is assumed valid.
    pub fn new(id: SessionId, config: &ShotTrackerConfig) -> Self {
        Self {
            id,
            ingest: config.ingest.clone(),
            hoop_estimate_samples: config.hoop_cleaner.estimate_samples,
            ball_track: TrackBuffer::new(ObjectClass::Ball),
            hoop_track: TrackBuffer::new(ObjectClass::Hoop),
            ball_cleaner: BallCleaner::new(config.ball_cleaner.clone()),
            hoop_cleaner: HoopCleaner::new(config.hoop_cleaner.clone()),
            regions: RegionClassifier::new(config.region.clone()),
            scorer: MakeMissClassifier::new(config.scoring.clone()),
            machine: ShotStateMachine::new(config.finalize_every_frames),
            ledger: ShotLedger::new(),
            last_frame: None,
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn ledger(&self) -> &ShotLedger {
        &self.ledger
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn phase(&self) -> ShotPhase {
        self.machine.phase()
    }

    pub fn ball_track(&self) -> &TrackBuffer {
        &self.ball_track
    }

    pub fn hoop_track(&self) -> &TrackBuffer {
        &self.hoop_track
    }

    /// Current hoop estimate, if any hoop observation survives cleaning.
    pub fn hoop_estimate(&self) -> Option<HoopEstimate> {
        HoopEstimate::from_track(&self.hoop_track, self.hoop_estimate_samples)
    }

    /// Owned result as of the last processed frame.
    pub fn snapshot(&self) -> ShotDetectionResult {
        self.ledger.snapshot()
    }

    /// Process one frame of detections.
    ///
    /// Fails only when the frame index goes backwards, in which case the
    /// session is left untouched. Malformed detections are dropped and
    /// reported in the outcome; the rest of the frame is still processed.
    pub fn process_frame(&mut self, frame: &FrameDetections) -> TrackerResult<FrameOutcome> {
        let frame_index = frame.frame_index;
        if let Some(last) = self.last_frame {
            if frame_index < last {
                return Err(TrackerError::FrameOrder {
                    frame: frame_index,
                    last,
                });
            }
        }

        let mut outcome = FrameOutcome {
            frame_index,
            ..Default::default()
        };

        let mut balls = Vec::new();
        let mut hoops = Vec::new();
        for (index, detection) in frame.detections.iter().enumerate() {
            self.stats.detections_seen += 1;
            if let Err(error) = detection.validate() {
                warn!(
                    session_id = %self.id,
                    frame = frame_index,
                    index,
                    class = %detection.class,
                    error = %error,
                    "Dropping malformed detection"
                );
                metrics::record_dropped_detection(&error);
                self.stats.malformed_dropped += 1;
                outcome.rejected.push(RejectedDetection {
                    index,
                    class: detection.class,
                    error,
                });
                continue;
            }
            match detection.class {
                ObjectClass::Ball => balls.push(detection),
                ObjectClass::Hoop => hoops.push(detection),
            }
        }

        // Hoops first so the relaxed ball floor sees this frame's hoop.
        for detection in hoops {
            if detection.confidence > self.ingest.hoop_min_confidence {
                self.hoop_track
                    .append(DetectionRecord::from_detection(detection, frame_index))?;
            } else {
                self.note_below_floor(ObjectClass::Hoop);
            }
        }
        let report = self.hoop_cleaner.clean(&mut self.hoop_track, frame_index);
        self.stats.cleaner_rejected += report.rejected as u64;

        let hoop = self.hoop_estimate();

        for detection in balls {
            if self.admit_ball(detection, hoop.as_ref()) {
                self.ball_track
                    .append(DetectionRecord::from_detection(detection, frame_index))?;
            } else {
                self.note_below_floor(ObjectClass::Ball);
            }
        }
        let report = self.ball_cleaner.clean(&mut self.ball_track, frame_index);
        self.stats.cleaner_rejected += report.rejected as u64;

        if let Some(hoop) = hoop {
            if !self.ball_track.is_empty() {
                if let Some(event) = self.step_machine(&hoop, frame_index) {
                    outcome.events.push(event);
                }
            }
        }

        self.machine.advance_frame();
        self.last_frame = Some(frame_index);
        self.stats.frames_processed += 1;
        metrics::record_frame();

        Ok(outcome)
    }

    /// Ball confidence floor, relaxed inside the padded hoop region.
    fn admit_ball(&self, detection: &RawDetection, hoop: Option<&HoopEstimate>) -> bool {
        if detection.confidence > self.ingest.ball_min_confidence {
            return true;
        }
        if detection.confidence <= self.ingest.ball_near_hoop_min_confidence {
            return false;
        }
        let (x, y) = detection.bbox.center();
        hoop.is_some_and(|hoop| self.regions.in_hoop_region(hoop, x, y))
    }

    fn note_below_floor(&mut self, class: ObjectClass) {
        self.stats.below_floor += 1;
        metrics::record_below_floor(class);
    }

    fn step_machine(&mut self, hoop: &HoopEstimate, frame_index: u64) -> Option<ShotEvent> {
        self.machine
            .observe(&self.ball_track, hoop, frame_index, &self.regions);

        if !self.machine.is_checkpoint() {
            return None;
        }
        let attempt = self.machine.take_resolved()?;

        let is_make = self.scorer.classify(&self.ball_track, hoop, &attempt);
        let event = self.ledger.record(frame_index, is_make);
        metrics::record_attempt(is_make);

        info!(
            session_id = %self.id,
            frame = frame_index,
            up_frame = attempt.up_frame,
            down_frame = attempt.down_frame,
            is_make,
            attempts = event.attempts,
            makes = event.makes,
            "Shot attempt finalized"
        );
        Some(event)
    }

    /// Consume the session and return its final result.
    ///
    /// An attempt still in flight is not counted.
    pub fn finish(self) -> ShotDetectionResult {
        if self.machine.phase() != ShotPhase::Idle {
            debug!(
                session_id = %self.id,
                phase = ?self.machine.phase(),
                "Session ended with an unresolved attempt; not counted"
            );
        }
        self.ledger.snapshot()
    }
}

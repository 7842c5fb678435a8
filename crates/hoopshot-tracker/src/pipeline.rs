//! Session lifecycle and detector-driven processing.
//!
//! [`ShotPipeline`] owns at most one active [`ShotSession`]. The object
//! detector is a separate capability ([`FrameDetector`]) so the tracking core
//! can be built and tested without any model or video I/O.

use hoopshot_models::{FrameDetections, RawDetection, SessionId, ShotDetectionResult};
use tracing::{info, warn};

use crate::config::ShotTrackerConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::session::{FrameOutcome, ShotSession};

/// Produces detections for one decoded frame.
///
/// Implementations wrap an object detection model, a recorded detection
/// log, or a stub in tests.
pub trait FrameDetector {
    /// Frame representation the detector consumes.
    type Frame;

    /// Detect balls and hoops in one frame.
    fn detect(&mut self, frame: &Self::Frame) -> TrackerResult<Vec<RawDetection>>;

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// Single-session shot tracking pipeline.
///
/// One instance serves one video at a time; run concurrent videos on
/// independent instances.
#[derive(Debug)]
pub struct ShotPipeline {
    config: ShotTrackerConfig,
    session: Option<ShotSession>,
}

impl ShotPipeline {
    /// Create a pipeline, validating the config.
    pub fn new(config: ShotTrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
        })
    }

    pub fn config(&self) -> &ShotTrackerConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ShotSession> {
        self.session.as_ref()
    }

    /// Start a new session.
    ///
    /// Fails if a session is already active; finish or [`reset`](Self::reset)
    /// it first.
    pub fn begin_session(&mut self, id: SessionId) -> TrackerResult<()> {
        if let Some(active) = &self.session {
            return Err(TrackerError::session_misuse(format!(
                "session {} is still active; finish or reset it before starting {}",
                active.id(),
                id
            )));
        }
        info!(session_id = %id, "Shot tracking session started");
        self.session = Some(ShotSession::new(id, &self.config));
        Ok(())
    }

    /// Submit the next frame of detections to the active session.
    pub fn submit_frame(&mut self, frame: &FrameDetections) -> TrackerResult<FrameOutcome> {
        self.active_mut()?.process_frame(frame)
    }

    /// Current partial result of the active session.
    pub fn snapshot(&self) -> TrackerResult<ShotDetectionResult> {
        self.session
            .as_ref()
            .map(ShotSession::snapshot)
            .ok_or_else(|| TrackerError::session_misuse("no active session"))
    }

    /// End the active session and return its result.
    pub fn finish_session(&mut self) -> TrackerResult<ShotDetectionResult> {
        let session = self
            .session
            .take()
            .ok_or_else(|| TrackerError::session_misuse("no active session to finish"))?;

        let id = session.id().clone();
        let stats = session.stats();
        let result = session.finish();
        info!(
            session_id = %id,
            frames = stats.frames_processed,
            attempts = result.total_attempts,
            makes = result.total_makes,
            percentage = result.shooting_percentage,
            "Shot tracking session finished"
        );
        Ok(result)
    }

    /// Abandon the active session, if any, returning its partial result.
    pub fn reset(&mut self) -> Option<ShotDetectionResult> {
        let session = self.session.take()?;
        warn!(session_id = %session.id(), "Shot tracking session reset");
        Some(session.finish())
    }

    /// Run a whole video through `detector` in a fresh session.
    ///
    /// Frames are indexed 0, 1, 2, ... in iteration order. Any error while
    /// detecting or tracking abandons the session and is returned to the
    /// caller.
    pub fn process_video<D, I>(
        &mut self,
        id: SessionId,
        detector: &mut D,
        frames: I,
    ) -> TrackerResult<ShotDetectionResult>
    where
        D: FrameDetector,
        I: IntoIterator<Item = D::Frame>,
    {
        self.begin_session(id)?;
        info!(detector = detector.name(), "Processing video");

        for (frame_index, frame) in frames.into_iter().enumerate() {
            let submitted = detector
                .detect(&frame)
                .map(|detections| FrameDetections::new(frame_index as u64, detections))
                .and_then(|frame| self.submit_frame(&frame));
            if let Err(e) = submitted {
                self.reset();
                return Err(e);
            }
        }

        self.finish_session()
    }

    fn active_mut(&mut self) -> TrackerResult<&mut ShotSession> {
        self.session
            .as_mut()
            .ok_or_else(|| TrackerError::session_misuse("no active session; call begin_session first"))
    }
}

impl Default for ShotPipeline {
    fn default() -> Self {
        Self {
            config: ShotTrackerConfig::default(),
            session: None,
        }
    }
}

//! Replaying recorded detection logs.
//!
//! A detection log is JSON Lines: one [`FrameDetections`] object per line,
//! frames in non-decreasing order. Blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use hoopshot_models::{FrameDetections, SessionId, ShotDetectionResult};
use hoopshot_tracker::{ShotPipeline, ShotTrackerConfig};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::SessionLogger;

/// Frames between progress log lines.
const PROGRESS_EVERY_FRAMES: u64 = 1000;

/// Streaming reader over a detection log.
pub struct DetectionLog<R> {
    path: PathBuf,
    lines: Lines<R>,
    line_no: usize,
}

impl DetectionLog<BufReader<File>> {
    pub fn open(path: &Path) -> WorkerResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> DetectionLog<R> {
    pub fn new(path: &Path, reader: R) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for DetectionLog<R> {
    type Item = WorkerResult<FrameDetections>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|source| {
                WorkerError::MalformedLine {
                    path: self.path.clone(),
                    line: self.line_no,
                    source,
                }
            }));
        }
    }
}

/// Result of replaying one log.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub session_id: SessionId,
    pub frames: u64,
    pub dropped_detections: u64,
    pub result: ShotDetectionResult,
}

/// Replay a detection log through a fresh session.
///
/// Any unreadable line or out-of-order frame fails the whole replay.
pub fn replay_log(
    frames: impl IntoIterator<Item = WorkerResult<FrameDetections>>,
    session_id: SessionId,
    config: &ShotTrackerConfig,
    logger: &SessionLogger,
) -> WorkerResult<ReplaySummary> {
    let mut pipeline = ShotPipeline::new(config.clone())?;
    pipeline.begin_session(session_id.clone())?;
    logger.log_start();

    let mut count = 0u64;
    let mut dropped = 0u64;
    for frame in frames {
        let frame = frame?;
        let outcome = pipeline.submit_frame(&frame)?;

        count += 1;
        dropped += outcome.rejected.len() as u64;
        if count % PROGRESS_EVERY_FRAMES == 0 {
            let snapshot = pipeline.snapshot()?;
            logger.log_progress(frame.frame_index, snapshot.total_attempts, snapshot.total_makes);
        }
    }

    if dropped > 0 {
        logger.log_warning(&format!("dropped {} malformed detections", dropped));
    }
    let result = pipeline.finish_session()?;
    logger.log_completion(count, &result);

    Ok(ReplaySummary {
        session_id,
        frames: count,
        dropped_detections: dropped,
        result,
    })
}

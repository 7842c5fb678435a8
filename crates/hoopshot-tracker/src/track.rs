//! Detection records and per-class track buffers.

use std::collections::VecDeque;

use hoopshot_models::{ObjectClass, RawDetection};

use crate::error::{TrackerError, TrackerResult};

/// One accepted observation of an object in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRecord {
    /// Box center x in pixels
    pub x: f64,
    /// Box center y in pixels (grows downward)
    pub y: f64,
    pub frame_index: u64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl DetectionRecord {
    pub fn new(x: f64, y: f64, frame_index: u64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            frame_index,
            width,
            height,
            confidence,
        }
    }

    /// Build a record from a validated detector output.
    pub fn from_detection(detection: &RawDetection, frame_index: u64) -> Self {
        let (x, y) = detection.bbox.center();
        Self::new(
            x,
            y,
            frame_index,
            detection.bbox.width(),
            detection.bbox.height(),
            detection.confidence,
        )
    }

    /// Box diagonal, used as the scale for distance thresholds.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Long side over short side (>= 1.0).
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.width.max(self.height) / self.width.min(self.height)
    }

    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

/// Ordered observation history for one object class.
///
/// Appended records are held as pending until a position cleaner settles or
/// discards them. Everything downstream of the cleaner reads settled records
/// only.
#[derive(Debug, Clone)]
pub struct TrackBuffer {
    class: ObjectClass,
    settled: VecDeque<DetectionRecord>,
    pending: Vec<DetectionRecord>,
}

impl TrackBuffer {
    pub fn new(class: ObjectClass) -> Self {
        Self {
            class,
            settled: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// Append a record. No filtering happens here, only the frame-order check.
    pub fn append(&mut self, record: DetectionRecord) -> TrackerResult<()> {
        if let Some(newest) = self.newest_frame() {
            if record.frame_index < newest {
                return Err(TrackerError::FrameOrder {
                    frame: record.frame_index,
                    last: newest,
                });
            }
        }
        self.pending.push(record);
        Ok(())
    }

    fn newest_frame(&self) -> Option<u64> {
        self.pending
            .last()
            .or_else(|| self.settled.back())
            .map(|r| r.frame_index)
    }

    /// Hand the pending records to the cleaner.
    pub(crate) fn take_pending(&mut self) -> Vec<DetectionRecord> {
        std::mem::take(&mut self.pending)
    }

    /// Accept a cleaned record into the settled history.
    pub(crate) fn settle(&mut self, record: DetectionRecord) {
        debug_assert!(self
            .settled
            .back()
            .map_or(true, |last| last.frame_index <= record.frame_index));
        self.settled.push_back(record);
    }

    /// Drop settled records observed before `frame`. Returns how many were dropped.
    pub(crate) fn prune_before(&mut self, frame: u64) -> usize {
        let mut pruned = 0;
        while self.settled.front().is_some_and(|r| r.frame_index < frame) {
            self.settled.pop_front();
            pruned += 1;
        }
        pruned
    }

    /// Keep only the `max_len` most recent settled records.
    pub(crate) fn truncate_front(&mut self, max_len: usize) -> usize {
        let excess = self.settled.len().saturating_sub(max_len);
        self.settled.drain(..excess);
        excess
    }

    /// Number of settled records.
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn get(&self, index: usize) -> Option<&DetectionRecord> {
        self.settled.get(index)
    }

    /// Most recent settled record.
    pub fn last(&self) -> Option<&DetectionRecord> {
        self.settled.back()
    }

    /// The settled record before the most recent one.
    pub fn second_last(&self) -> Option<&DetectionRecord> {
        self.settled.len().checked_sub(2).and_then(|i| self.settled.get(i))
    }

    /// Settled records, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DetectionRecord> + ExactSizeIterator {
        self.settled.iter()
    }

    /// Settled records observed at or after `current_frame - lookback`, newest first.
    pub fn recent(&self, current_frame: u64, lookback: u64) -> impl Iterator<Item = &DetectionRecord> {
        let oldest = current_frame.saturating_sub(lookback);
        self.settled
            .iter()
            .rev()
            .take_while(move |r| r.frame_index >= oldest)
    }

    /// Discard all history.
    pub fn clear(&mut self) {
        self.settled.clear();
        self.pending.clear();
    }
}

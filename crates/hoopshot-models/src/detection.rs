//! Detector output models.
//!
//! These are the per-frame inputs handed to the tracker by whatever object
//! detector produced them. Boxes are in pixel coordinates with the origin at
//! the top-left corner, so larger `y` means lower in the frame.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Object class reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    /// The basketball.
    Ball,
    /// The hoop / rim.
    Hoop,
}

impl ObjectClass {
    /// Returns the class name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Ball => "ball",
            ObjectClass::Hoop => "hoop",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Axis-aligned box in pixel coordinates (`x2 > x1`, `y2 > y1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PixelBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl PixelBox {
    /// Create a new box from its corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            x1: cx - width / 2.0,
            y1: cy - height / 2.0,
            x2: cx + width / 2.0,
            y2: cy + height / 2.0,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Box midpoint.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }
}

/// One detector output for one object in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawDetection {
    /// Detected object class
    pub class: ObjectClass,
    /// Bounding box in pixels
    #[serde(rename = "box")]
    pub bbox: PixelBox,
    /// Detector confidence in (0, 1]
    pub confidence: f64,
}

impl RawDetection {
    pub fn new(class: ObjectClass, bbox: PixelBox, confidence: f64) -> Self {
        Self {
            class,
            bbox,
            confidence,
        }
    }

    /// Check that the box is non-degenerate and the confidence is in (0, 1].
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !self.bbox.is_finite() {
            return Err(DetectionError::NonFiniteBox);
        }
        if self.bbox.x2 <= self.bbox.x1 || self.bbox.y2 <= self.bbox.y1 {
            return Err(DetectionError::DegenerateBox {
                width: self.bbox.width(),
                height: self.bbox.height(),
            });
        }
        if !(self.confidence > 0.0 && self.confidence <= 1.0) {
            return Err(DetectionError::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }
}

/// All detections for one frame, as produced by the detector collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameDetections {
    /// Caller-assigned frame index; must be non-decreasing within a session
    pub frame_index: u64,
    /// Zero or more detections
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl FrameDetections {
    pub fn new(frame_index: u64, detections: Vec<RawDetection>) -> Self {
        Self {
            frame_index,
            detections,
        }
    }

    /// A frame in which the detector found nothing.
    pub fn empty(frame_index: u64) -> Self {
        Self::new(frame_index, Vec::new())
    }
}

/// Reasons a single detection is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("Degenerate box: width={width}, height={height}")]
    DegenerateBox { width: f64, height: f64 },

    #[error("Box coordinates are not finite")]
    NonFiniteBox,

    #[error("Confidence {0} outside (0, 1]")]
    ConfidenceOutOfRange(f64),
}

impl DetectionError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DetectionError::DegenerateBox { .. } => "degenerate_box",
            DetectionError::NonFiniteBox => "non_finite_box",
            DetectionError::ConfidenceOutOfRange(_) => "confidence_out_of_range",
        }
    }
}

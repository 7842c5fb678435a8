//! Accumulated shot record for one session.

use hoopshot_models::{shooting_percentage, ShotDetectionResult, ShotEvent};

/// Append-only record of finalized attempts.
///
/// `attempts` and `makes` always equal the count and make-sum over
/// `events`; the percentage is derived on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotLedger {
    attempts: u32,
    makes: u32,
    events: Vec<ShotEvent>,
}

impl ShotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finalized attempt and return its event.
    pub fn record(&mut self, frame: u64, is_make: bool) -> ShotEvent {
        self.attempts += 1;
        if is_make {
            self.makes += 1;
        }

        let event = ShotEvent {
            frame,
            is_make,
            attempts: self.attempts,
            makes: self.makes,
        };
        self.events.push(event);
        event
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn makes(&self) -> u32 {
        self.makes
    }

    pub fn events(&self) -> &[ShotEvent] {
        &self.events
    }

    pub fn percentage(&self) -> f64 {
        shooting_percentage(self.makes, self.attempts)
    }

    /// Owned copy of the ledger in the output contract shape.
    pub fn snapshot(&self) -> ShotDetectionResult {
        ShotDetectionResult {
            total_attempts: self.attempts,
            total_makes: self.makes,
            shooting_percentage: self.percentage(),
            shot_events: self.events.clone(),
        }
    }
}

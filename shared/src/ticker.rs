//! Repeating period timer polled from a frame loop

use std::time::{Duration, Instant};

/// Fires once when first polled, then once per elapsed period
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// One tick per second
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Returns true when the period has elapsed since the last tick
    ///
    /// Missed periods collapse into a single tick; the schedule restarts from
    /// `now` rather than trying to catch up.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            _ => {
                self.next_due = Some(now + self.period);
                true
            }
        }
    }
}

//! Deadline-based debounce.
//!
//! The engine owns no timers. Components record deadlines, the host asks
//! for the earliest one and calls back (`GestureSession::tick`) once it has
//! passed.

/// A single re-armable deadline. Re-arming pushes the deadline out, so a
/// burst of calls collapses into one firing after the burst ends.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    delay_ms: f64,
    deadline_ms: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
        }
    }

    pub fn arm(&mut self, now_ms: f64) {
        self.deadline_ms = Some(now_ms + self.delay_ms);
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline_ms
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Returns `true` exactly once per arming, when `now_ms` reaches the
    /// deadline.
    pub fn fire_if_due(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

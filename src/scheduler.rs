//! Cooperative task timing.
//!
//! Each periodic task owns one [`TaskTimer`] holding its next-due
//! timestamp.  A scheduler pass ([`Regulator::poll`]) checks every
//! timer against the monotonic clock and runs at most one action per
//! task per pass.
//!
//! [`Regulator::poll`]: crate::service::Regulator::poll
//!
//! Re-arming is `now + interval` measured from the moment the task
//! fires — fixed cadence, not fixed rate.  A late pass therefore
//! shifts the whole train rather than bunching catch-up fires, which
//! is what a single-threaded loop with occasional long touch
//! interactions needs.

/// Due-timestamp timer for one periodic task.
#[derive(Debug, Clone, Copy)]
pub struct TaskTimer {
    next_due: u64,
    interval: u64,
}

impl TaskTimer {
    /// A timer that is due immediately and then every `interval_ms`.
    pub fn new(interval_ms: u32) -> Self {
        Self {
            next_due: 0,
            interval: u64::from(interval_ms),
        }
    }

    /// Check the timer against the clock.  Fires at most once per call
    /// and re-arms itself `interval` past the fire time.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms >= self.next_due {
            self.next_due = now_ms + self.interval;
            true
        } else {
            false
        }
    }

    /// Next fire time (for inspection/tests).
    pub fn next_due(&self) -> u64 {
        self.next_due
    }
}

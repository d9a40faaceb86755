//! Drying cycle countdown.
//!
//! Timestamps are milliseconds from a free-running `u32` clock that rolls
//! over every ~49.7 days.  Elapsed time is always computed with wrapping
//! subtraction so a cycle that straddles the rollover still counts down
//! correctly.

/// Countdown armed with a duration at a point in time.
///
/// Re-arming discards whatever was left of the previous cycle.  Once the
/// duration has elapsed `remaining` stays at zero; there is no auto re-arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DryCycleTimer {
    duration_ms: u32,
    armed_at_ms: u32,
}

impl DryCycleTimer {
    /// A disarmed timer: zero duration, so `remaining` is always zero.
    pub const fn new() -> Self {
        Self {
            duration_ms: 0,
            armed_at_ms: 0,
        }
    }

    /// Start a new cycle of `duration_ms` beginning at `now_ms`.
    pub fn arm(&mut self, duration_ms: u32, now_ms: u32) {
        self.duration_ms = duration_ms;
        self.armed_at_ms = now_ms;
    }

    /// Milliseconds left in the cycle, clamped at zero.
    pub fn remaining(&self, now_ms: u32) -> u32 {
        let elapsed = now_ms.wrapping_sub(self.armed_at_ms);
        self.duration_ms.saturating_sub(elapsed)
    }

    /// Whole minutes left, truncated.
    pub fn remaining_minutes(&self, now_ms: u32) -> u32 {
        self.remaining(now_ms) / 60_000
    }

    pub fn is_elapsed(&self, now_ms: u32) -> bool {
        self.remaining(now_ms) == 0
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn armed_at_ms(&self) -> u32 {
        self.armed_at_ms
    }
}

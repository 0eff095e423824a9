//! Per-instance timeout state.
//!
//! Both kinds live inside the primitive that owns them and are reset in
//! its `initialize`, so a re-scheduled primitive always starts fresh.

use std::time::Duration;

/// Iteration-count backstop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimeout {
    limit: u32,
    elapsed: u32,
}

impl TickTimeout {
    pub const fn new(limit: u32) -> Self {
        Self { limit, elapsed: 0 }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    /// Count one evaluation; true once `limit` evaluations have happened.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        self.elapsed >= self.limit
    }

    #[inline]
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }

    #[inline]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

/// Wall-clock backstop measured against the driver's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineTimeout {
    duration: Duration,
    started: Option<Duration>,
}

impl DeadlineTimeout {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    /// Arm the deadline at clock time `now`.
    #[inline]
    pub fn start(&mut self, now: Duration) {
        self.started = Some(now);
    }

    #[inline]
    pub fn reset(&mut self) {
        self.started = None;
    }

    /// True once `duration` has passed since `start`. Unarmed never expires.
    #[inline]
    pub fn expired(&self, now: Duration) -> bool {
        self.started
            .is_some_and(|t0| now.saturating_sub(t0) >= self.duration)
    }

    #[inline]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

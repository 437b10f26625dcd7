use std::time::Duration;

use tokio::time::Instant;

/// Gaps at least this long are treated as the user having been away and earn no credit.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    /// The page is hidden. The first pulse after resuming only re-arms the timer.
    Paused,
}

/// Decides which gaps between pulses count as active usage.
#[derive(Debug)]
pub struct ActivityStateMachine {
    state: ActivityState,
    last_pulse: Instant,
}

impl ActivityStateMachine {
    pub fn new(now: Instant) -> Self {
        Self {
            state: ActivityState::Active,
            last_pulse: now,
        }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn last_pulse(&self) -> Instant {
        self.last_pulse
    }

    /// Registers an interaction at `at` and returns the gap that should be credited, if any.
    ///
    /// The state is consulted before it's switched back to [ActivityState::Active], so the gap
    /// that spans a hidden period is never credited.
    pub fn pulse(&mut self, at: Instant) -> Option<Duration> {
        let gap = at.saturating_duration_since(self.last_pulse);
        let creditable = (gap < IDLE_THRESHOLD && self.state == ActivityState::Active).then_some(gap);

        self.last_pulse = at;
        self.state = ActivityState::Active;
        creditable
    }

    pub fn page_hidden(&mut self) {
        self.state = ActivityState::Paused;
    }

    /// Re-arms the gap measurement without crediting anything. The state stays as it is until a
    /// real interaction arrives.
    pub fn page_visible(&mut self, now: Instant) {
        self.last_pulse = now;
    }
}

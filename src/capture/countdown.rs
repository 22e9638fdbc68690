//! Countdown timer driven by explicit timestamps.
//!
//! The timer never schedules anything on its own: callers feed the current time to
//! [`Countdown::poll`] and receive the events that became due since the previous poll.

use std::time::Duration;

use crate::foundation::error::{PhotostripError, PhotostripResult};

pub const MAX_COUNTDOWN_SECONDS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Visible counter value; the first tick fires at start.
    Tick { remaining: u32 },
    /// Fires exactly once, `seconds` after start.
    Completed,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    seconds: u32,
    started_at: Duration,
    ticks_emitted: u32,
    completed: bool,
    cancelled: bool,
}

impl Countdown {
    pub fn start(seconds: u32, now: Duration) -> PhotostripResult<Self> {
        if seconds == 0 {
            return Err(PhotostripError::validation(
                "countdown must last at least one second",
            ));
        }
        Ok(Self {
            seconds,
            started_at: now,
            ticks_emitted: 0,
            completed: false,
            cancelled: false,
        })
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Emit every tick and the completion that became due at or before `now`.
    pub fn poll(&mut self, now: Duration) -> Vec<CountdownEvent> {
        if self.cancelled || self.completed {
            return Vec::new();
        }
        let whole = now.saturating_sub(self.started_at).as_secs();
        let mut out = Vec::new();
        while self.ticks_emitted < self.seconds && u64::from(self.ticks_emitted) <= whole {
            out.push(CountdownEvent::Tick {
                remaining: self.seconds - self.ticks_emitted,
            });
            self.ticks_emitted += 1;
        }
        if whole >= u64::from(self.seconds) {
            self.completed = true;
            out.push(CountdownEvent::Completed);
        }
        out
    }

    /// After cancellation every poll is empty; completion can no longer fire.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Counter value currently displayed.
    pub fn remaining(&self) -> u32 {
        if self.completed {
            0
        } else if self.ticks_emitted == 0 {
            self.seconds
        } else {
            self.seconds - self.ticks_emitted + 1
        }
    }

    /// Time at which the next event becomes due, `None` once finished or cancelled.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.cancelled || self.completed {
            return None;
        }
        Some(self.started_at + Duration::from_secs(u64::from(self.ticks_emitted)))
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/countdown.rs"]
mod tests;

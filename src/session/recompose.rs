use std::time::Duration;

use crate::compose::compositor::StyleConfig;

/// Monotonic tag of one recompose request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecomposeRequest {
    pub generation: Generation,
    pub style: StyleConfig,
}

#[derive(Clone, Debug)]
struct Pending {
    request: RecomposeRequest,
    due: Duration,
}

/// Debounced, latest-wins recompose requests.
///
/// Every request bumps the generation; only a result tagged with the newest generation
/// may be applied, so a slow composite for an older style is dropped instead of
/// overwriting a newer one.
#[derive(Clone, Debug)]
pub struct RecomposeQueue {
    debounce: Duration,
    latest: u64,
    pending: Option<Pending>,
}

impl RecomposeQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            latest: 0,
            pending: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Replace any pending request; the new one becomes due after the debounce window.
    pub fn request(&mut self, style: StyleConfig, now: Duration) -> Generation {
        self.enqueue(style, now + self.debounce)
    }

    /// Like [`Self::request`] but due immediately.
    pub fn request_now(&mut self, style: StyleConfig, now: Duration) -> Generation {
        self.enqueue(style, now)
    }

    fn enqueue(&mut self, style: StyleConfig, due: Duration) -> Generation {
        self.latest += 1;
        let generation = Generation(self.latest);
        tracing::trace!(generation = generation.0, ?due, "recompose requested");
        self.pending = Some(Pending {
            request: RecomposeRequest { generation, style },
            due,
        });
        generation
    }

    pub fn take_due(&mut self, now: Duration) -> Option<RecomposeRequest> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.request),
            _ => None,
        }
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }

    /// Drop the pending request and make every handed-out generation stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.due)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/recompose.rs"]
mod tests;

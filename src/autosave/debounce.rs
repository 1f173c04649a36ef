use std::time::{Duration, Instant};

/// A cancellable single-shot timer.
///
/// There is at most one pending deadline. Scheduling again replaces it, so
/// a burst of changes produces one firing, a full `delay` after the last.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    /// A timer with nothing scheduled.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The quiet period between the last schedule and the firing.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending deadline and schedule a new one at `now + delay`.
    ///
    /// A deadline past the end of the clock is never reached, so nothing is
    /// left pending in that case.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = now.checked_add(self.delay);
        if self.deadline.is_none() {
            tracing::warn!(delay = ?self.delay, "debounce delay out of range, not scheduling");
        }
    }

    /// Drop the pending deadline, if any.
    pub const fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has elapsed at `now`.
    ///
    /// Returns `true` at most once per schedule.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

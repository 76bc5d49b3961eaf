//! Debounced-save bookkeeping: an explicit dirty flag plus a deadline,
//! instead of timer callbacks scattered across callers. The owner polls
//! `take_due` from its interval tick and calls `flush` on page-hide so the
//! final write is never lost to a pending timer.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    dirty: bool,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            dirty: false,
            deadline: None,
        }
    }

    /// Mark state dirty and (re)arm the deadline.
    pub fn note_change(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + self.delay);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when a dirty write has aged past the debounce delay.
    pub fn is_due(&self, now: Instant) -> bool {
        self.dirty && self.deadline.is_some_and(|d| now >= d)
    }

    /// Consume a due write: clears the flag and returns true exactly when
    /// the caller should save now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.clear();
            return true;
        }
        false
    }

    /// Immediate flush regardless of the deadline (page-hide / unmount).
    /// Returns true when there was a pending write to flush.
    pub fn flush(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.clear();
        was_dirty
    }

    pub fn cancel(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.dirty = false;
        self.deadline = None;
    }
}

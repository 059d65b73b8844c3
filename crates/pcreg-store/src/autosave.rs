//! Autosave debounce.
//!
//! A single pending deadline. Each request pushes it to `now + delay`, so a
//! burst of edits produces one write once the burst has been quiet for the
//! whole window. Time is always passed in; nothing here sleeps or spawns.

use chrono::{DateTime, Duration, Utc};

const DEFAULT_DELAY_MS: i64 = 500;

#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    delay: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_DELAY_MS))
    }
}

impl AutosaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay: delay.max(Duration::zero()), deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the window from `now`, replacing any pending deadline.
    /// A window that runs past the end of time is due immediately.
    pub fn request(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let deadline = now.checked_add_signed(self.delay).unwrap_or(now);
        self.deadline = Some(deadline);
        deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the pending deadline has been reached
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

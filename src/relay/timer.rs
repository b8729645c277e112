//! Debounce timer
//!
//! A `Debouncer` holds at most one pending value and the instant it becomes
//! due. `reset` replaces both; `cancel` drops them. The owner awaits
//! [`sleep_until_deadline`] on the current deadline and then collects the
//! value with `take_expired`, which keeps the timer usable inside a
//! `tokio::select!` loop that also needs `&mut self` elsewhere.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending value and restart the window from now
    pub fn reset(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Drop the pending value, returning it if there was one
    pub fn cancel(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the pending value if its window has elapsed
    pub fn take_expired(&mut self) -> Option<T> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}

/// Sleep until `deadline`, or forever when there is none
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

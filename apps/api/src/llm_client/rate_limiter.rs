//! Rolling-window request limiter.
//!
//! Counts accepted calls in the trailing window (default 60 s) ending at `now`.
//! The window slides continuously: every evaluation first drops records that
//! fell out of it, so capacity frees up one call at a time rather than all at
//! once on a bucket boundary.
//!
//! The clock is passed in explicitly (`tokio::time::Instant`) so tests can
//! drive it with a paused runtime.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_QUOTA: usize = 30;

#[derive(Debug)]
pub struct RateLimiter {
    quota: usize,
    window: Duration,
    /// Oldest first.
    records: VecDeque<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA)
    }
}

impl RateLimiter {
    pub fn new(quota: usize) -> Self {
        Self::with_window(quota, DEFAULT_WINDOW)
    }

    pub fn with_window(quota: usize, window: Duration) -> Self {
        Self {
            quota: quota.max(1),
            window,
            records: VecDeque::new(),
        }
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    /// True when a call may be dispatched at `now` without waiting.
    pub fn is_allowed(&mut self, now: Instant) -> bool {
        self.purge(now);
        self.records.len() < self.quota
    }

    /// How long until the oldest in-window record expires. Zero when a slot is free.
    pub fn time_until_allowed(&mut self, now: Instant) -> Duration {
        if self.is_allowed(now) {
            return Duration::ZERO;
        }
        match self.records.front() {
            Some(&oldest) => self
                .window
                .saturating_sub(now.saturating_duration_since(oldest)),
            None => Duration::ZERO,
        }
    }

    /// Appends an accepted call.
    pub fn record(&mut self, at: Instant) {
        self.records.push_back(at);
    }

    /// Number of records inside the window ending at `now`.
    pub fn in_window(&mut self, now: Instant) -> usize {
        self.purge(now);
        self.records.len()
    }

    // Only records in (now - window, now] survive.
    fn purge(&mut self, now: Instant) {
        while let Some(&oldest) = self.records.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.records.pop_front();
            } else {
                break;
            }
        }
    }
}

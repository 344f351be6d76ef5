use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Result of charging one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

impl RateDecision {
    /// Whole seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        let left = self.reset_at.saturating_duration_since(now);
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }
}

/// Fixed-window counter per client key.
///
/// The first attempt opens a window; at most `max_attempts` are allowed
/// until it elapses, after which the next attempt opens a fresh one.
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    max_attempts: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self { windows: DashMap::new(), max_attempts, window }
    }

    pub fn from_config(cfg: &configs::ContactConfig) -> Self {
        Self::new(cfg.max_attempts, Duration::from_secs(cfg.window_secs))
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window { count: 0, started: now });
        if now.saturating_duration_since(entry.started) > self.window {
            *entry = Window { count: 0, started: now };
        }
        entry.count = entry.count.saturating_add(1);
        let reset_at = entry.started + self.window;
        if entry.count > self.max_attempts {
            debug!(key, count = entry.count, "rate limit exceeded");
            return RateDecision { allowed: false, remaining: 0, reset_at };
        }
        RateDecision { allowed: true, remaining: self.max_attempts - entry.count, reset_at }
    }

    /// Drop windows that have elapsed; returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.windows.retain(|_, w| {
            let live = now.saturating_duration_since(w.started) <= self.window;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    pub fn tracked_clients(&self) -> usize { self.windows.len() }
}

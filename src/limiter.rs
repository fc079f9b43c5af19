// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter for the contact endpoint.
//!
//! Tracks one counted window per client key, with an insertion-order queue
//! driving two lazy cleanups on every registration: expired windows are
//! purged from the front, and once the queue grows past `max_entries` the
//! oldest keys are evicted regardless of expiry. A key that starts a fresh
//! window gets a new queue entry while any stale one stays in place, so the
//! queue bounds total length rather than distinct live keys and eviction is
//! approximate.

use crate::config::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of registering one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether this attempt exceeded the per-window allowance
    pub limited: bool,
    /// Time until the client's current window ends
    pub retry_after: Duration,
    /// Attempts left in the current window
    pub remaining: u32,
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    expires_at: Instant,
}

#[derive(Debug)]
struct QueueEntry {
    key: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct LimiterState {
    entries: HashMap<String, WindowEntry>,
    queue: VecDeque<QueueEntry>,
}

impl LimiterState {
    /// Drop expired windows from the queue front, then evict the oldest
    /// keys while the queue is over capacity. A queue entry only deletes
    /// the tracked window it originally recorded; a window refreshed since
    /// then is left alone.
    fn purge(&mut self, now: Instant, max_entries: usize) {
        while self
            .queue
            .front()
            .is_some_and(|front| front.expires_at <= now)
        {
            if let Some(popped) = self.queue.pop_front() {
                let expired = self
                    .entries
                    .get(&popped.key)
                    .is_some_and(|entry| entry.expires_at <= now);
                if expired {
                    self.entries.remove(&popped.key);
                }
            }
        }

        let mut evicted = 0usize;
        while self.queue.len() > max_entries {
            let Some(oldest) = self.queue.pop_front() else {
                break;
            };
            let current = self
                .entries
                .get(&oldest.key)
                .is_some_and(|entry| entry.expires_at == oldest.expires_at);
            if current {
                self.entries.remove(&oldest.key);
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, tracked = self.entries.len(), "rate limiter evicted oldest clients");
        }
    }
}

/// Thread-safe sliding-window rate limiter keyed by client identifier.
pub struct SlidingWindowRateLimiter {
    window: Duration,
    max_requests: u32,
    max_entries: usize,
    state: Mutex<LimiterState>,
}

impl SlidingWindowRateLimiter {
    /// Create a limiter from configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            window: config.window(),
            max_requests: config.max_requests,
            max_entries: config.max_entries,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Register an attempt for `key` and report whether it is admitted.
    ///
    /// The count keeps rising past the allowance while a client hammers
    /// the endpoint, so a limited window never resets early. Never fails;
    /// a poisoned lock is recovered because the state stays consistent
    /// under this module's short non-panicking critical sections.
    pub fn register_attempt(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        state.purge(now, self.max_entries);

        if let Some(entry) = state.entries.get_mut(key) {
            if entry.expires_at > now {
                entry.count = entry.count.saturating_add(1);
                let retry_after = entry.expires_at.saturating_duration_since(now);
                if entry.count > self.max_requests {
                    return RateLimitResult {
                        limited: true,
                        retry_after,
                        remaining: 0,
                    };
                }
                return RateLimitResult {
                    limited: false,
                    retry_after,
                    remaining: self.max_requests.saturating_sub(entry.count),
                };
            }
        }

        // Absent or expired: start a fresh window.
        let expires_at = now + self.window;
        state.entries.insert(
            key.to_string(),
            WindowEntry {
                count: 1,
                expires_at,
            },
        );
        state.queue.push_back(QueueEntry {
            key: key.to_string(),
            expires_at,
        });

        RateLimitResult {
            limited: false,
            retry_after: self.window,
            remaining: self.max_requests.saturating_sub(1),
        }
    }

    /// Clear all tracked windows. Intended for tests and operational resets.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn limiter(window_ms: u64, max_requests: u32, max_entries: usize) -> SlidingWindowRateLimiter {
        SlidingWindowRateLimiter::new(RateLimitConfig {
            window_ms,
            max_requests,
            max_entries,
        })
    }

    #[test]
    fn test_admits_up_to_allowance_then_limits() {
        let limiter = limiter(60_000, 5, 1_000);

        for attempt in 1..=5u32 {
            let result = limiter.register_attempt("203.0.113.7");
            assert!(!result.limited, "attempt {attempt} should be admitted");
            assert_eq!(result.remaining, 5 - attempt);
        }

        let sixth = limiter.register_attempt("203.0.113.7");
        assert!(sixth.limited);
        assert_eq!(sixth.remaining, 0);
        assert!(sixth.retry_after <= Duration::from_millis(60_000));
        assert!(sixth.retry_after > Duration::ZERO);
    }

    #[test]
    fn test_first_attempt_reports_full_window() {
        let limiter = limiter(60_000, 5, 1_000);
        let first = limiter.register_attempt("198.51.100.1");
        assert!(!first.limited);
        assert_eq!(first.retry_after, Duration::from_millis(60_000));
        assert_eq!(first.remaining, 4);
    }

    #[test]
    fn test_limited_window_does_not_reset() {
        let limiter = limiter(60_000, 2, 1_000);
        limiter.register_attempt("k");
        limiter.register_attempt("k");

        for _ in 0..10 {
            let result = limiter.register_attempt("k");
            assert!(result.limited);
            assert_eq!(result.remaining, 0);
        }
    }

    #[test]
    fn test_keys_counted_independently() {
        let limiter = limiter(60_000, 1, 1_000);
        assert!(!limiter.register_attempt("a").limited);
        assert!(!limiter.register_attempt("b").limited);
        assert!(limiter.register_attempt("a").limited);
        assert!(!limiter.register_attempt("c").limited);
    }

    #[test]
    fn test_window_expiry_starts_fresh_count() {
        let limiter = limiter(40, 1, 1_000);
        assert!(!limiter.register_attempt("k").limited);
        assert!(limiter.register_attempt("k").limited);

        thread::sleep(Duration::from_millis(60));

        let fresh = limiter.register_attempt("k");
        assert!(!fresh.limited);
        assert_eq!(fresh.remaining, 0);
        assert_eq!(fresh.retry_after, Duration::from_millis(40));
    }

    #[test]
    fn test_oldest_keys_evicted_past_capacity() {
        let limiter = limiter(60_000, 1, 3);
        for key in ["a", "b", "c", "d"] {
            assert!(!limiter.register_attempt(key).limited);
        }

        // "a" was the oldest tracked key; capacity pressure drops it, so
        // its next attempt starts over instead of being limited.
        assert!(!limiter.register_attempt("a").limited);

        // "d" is recent enough to still be tracked.
        assert!(limiter.register_attempt("d").limited);
    }

    #[test]
    fn test_reset_clears_all_windows() {
        let limiter = limiter(60_000, 1, 1_000);
        limiter.register_attempt("k");
        assert!(limiter.register_attempt("k").limited);

        limiter.reset();
        assert!(!limiter.register_attempt("k").limited);
    }

    #[test]
    fn test_registration_across_threads() {
        let limiter = std::sync::Arc::new(limiter(60_000, 50, 1_000));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = limiter.clone();
            handles.push(thread::spawn(move || {
                let mut limited = 0u32;
                for _ in 0..25 {
                    if limiter.register_attempt("shared").limited {
                        limited += 1;
                    }
                }
                limited
            }));
        }

        let limited: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 100 attempts against an allowance of 50: exactly half are refused.
        assert_eq!(limited, 50);
    }
}

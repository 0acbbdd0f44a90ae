//! Per-requester sliding-window rate limiting for contract creation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Sliding-window counter keyed by requester identity. Administrators are
/// exempted by the caller before the counter is consulted.
pub struct RequestRateLimiter {
    window: Duration,
    max_requests: usize,
    inner: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RequestRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        assert!(window > Duration::ZERO, "Rate window must be positive");
        assert!(max_requests > 0, "Rate cap must be positive");
        Self {
            window,
            max_requests: max_requests as usize,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `key` and returns `Err(retry_after)` when the
    /// cap is already reached within the window.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(Instant::now(), key)
    }

    pub fn check_at(&self, now: Instant, key: &str) -> Result<(), Duration> {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            // Fail open: a poisoned counter must not block order entry.
            Err(_) => return Ok(()),
        };

        let stamps = inner.entry(key.to_string()).or_default();
        stamps.retain(|stamp| now.duration_since(*stamp) <= self.window);

        if stamps.len() >= self.max_requests {
            let oldest = stamps
                .iter()
                .min()
                .copied()
                .unwrap_or(now);
            let retry_after = self.window.saturating_sub(now.duration_since(oldest));
            return Err(retry_after);
        }

        stamps.push(now);
        Ok(())
    }

    /// Drops empty and fully expired keys. Run by the background sweep.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&self, now: Instant) {
        if let Ok(mut inner) = self.inner.lock() {
            let before = inner.len();
            inner.retain(|_, stamps| {
                stamps.retain(|stamp| now.duration_since(*stamp) <= self.window);
                !stamps.is_empty()
            });
            let pruned = before - inner.len();
            if pruned > 0 {
                debug!("Rate limiter pruned {pruned} idle requester keys");
            }
        }
    }

    pub fn key_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn requests_under_the_cap_pass() {
        let limiter = RequestRateLimiter::new(WINDOW, 5);
        let t0 = Instant::now();
        for i in 0..5 {
            assert!(
                limiter
                    .check_at(t0 + Duration::from_secs(i), "U1")
                    .is_ok()
            );
        }
    }

    #[test]
    fn request_over_the_cap_is_rejected_with_retry_after() {
        let limiter = RequestRateLimiter::new(WINDOW, 5);
        let t0 = Instant::now();
        for _ in 0..5 {
            limiter.check_at(t0, "U1").expect("under cap");
        }

        let retry = limiter
            .check_at(t0 + Duration::from_secs(10), "U1")
            .expect_err("over cap");
        assert_eq!(retry, Duration::from_secs(50));
    }

    #[test]
    fn window_elapse_resets_the_counter() {
        let limiter = RequestRateLimiter::new(WINDOW, 5);
        let t0 = Instant::now();
        for _ in 0..5 {
            limiter.check_at(t0, "U1").expect("under cap");
        }
        assert!(limiter.check_at(t0 + WINDOW + Duration::from_secs(1), "U1").is_ok());
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = RequestRateLimiter::new(WINDOW, 1);
        let t0 = Instant::now();
        limiter.check_at(t0, "U1").expect("first U1");
        assert!(limiter.check_at(t0, "U2").is_ok());
        assert!(limiter.check_at(t0, "U1").is_err());
    }

    #[test]
    fn prune_drops_idle_keys() {
        let limiter = RequestRateLimiter::new(WINDOW, 5);
        let t0 = Instant::now();
        limiter.check_at(t0, "U1").expect("record");
        limiter.check_at(t0 + WINDOW, "U2").expect("record");

        limiter.prune_at(t0 + WINDOW + Duration::from_secs(1));
        assert_eq!(limiter.key_count(), 1);
    }
}

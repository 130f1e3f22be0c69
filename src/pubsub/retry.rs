//! Transport-level retry schedule used by [`PubsubClient`](super::PubsubClient).
//!
//! Each request gets a fresh [`RetryBackoff`] allowing `retry` additional
//! attempts. Delays grow exponentially from `base` up to `cap` and are
//! jittered so that many workers retrying together spread out.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Default delay before the first retry.
pub const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(100);
/// Default ceiling for a single retry delay.
pub const DEFAULT_RETRY_CAP: Duration = Duration::from_secs(10);

/// Exponential backoff parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_RETRY_BASE,
            cap: DEFAULT_RETRY_CAP,
        }
    }
}

/// Tracks the attempts made for one request and produces jittered delays.
pub struct RetryBackoff {
    policy: RetryPolicy,
    current: Duration,
    remaining: u32,
    rng: StdRng,
}

impl RetryBackoff {
    /// Allow up to `retries` attempts after the first.
    pub fn new(policy: RetryPolicy, retries: u32) -> Self {
        Self {
            current: policy.base,
            remaining: retries,
            rng: StdRng::from_entropy(),
            policy,
        }
    }

    /// Delay before the next attempt, or `None` once retries are exhausted.
    pub fn next_sleep(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let max_ms = self.current.as_millis().min(u128::from(u64::MAX)) as u64;
        self.current = self.current.saturating_mul(2).min(self.policy.cap);

        let sleep_ms = match max_ms {
            0 | 1 => max_ms,
            _ => self.rng.gen_range(max_ms / 2..=max_ms),
        };
        Some(Duration::from_millis(sleep_ms))
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base_ms: u64, cap_ms: u64) -> RetryPolicy {
        RetryPolicy {
            base: Duration::from_millis(base_ms),
            cap: Duration::from_millis(cap_ms),
        }
    }

    #[test]
    fn zero_retries_never_sleeps() {
        let mut backoff = RetryBackoff::new(policy(10, 100), 0);
        assert!(backoff.next_sleep().is_none());
    }

    #[test]
    fn yields_exactly_retry_count_delays() {
        let mut backoff = RetryBackoff::new(policy(10, 100), 3);
        let delays: Vec<_> = std::iter::from_fn(|| backoff.next_sleep()).collect();
        assert_eq!(delays.len(), 3);
        assert_eq!(backoff.remaining(), 0);
    }

    #[test]
    fn delays_stay_within_cap() {
        let mut backoff = RetryBackoff::new(policy(40, 100), 8);
        while let Some(delay) = backoff.next_sleep() {
            assert!(delay <= Duration::from_millis(100), "{delay:?} exceeds cap");
        }
    }

    #[test]
    fn first_delay_is_jittered_below_base() {
        let mut backoff = RetryBackoff::new(policy(40, 1_000), 1);
        let delay = backoff.next_sleep().expect("one retry");
        assert!(delay >= Duration::from_millis(20));
        assert!(delay <= Duration::from_millis(40));
    }
}

//! # Exponential delay between retry attempts.
//!
//! [`BackoffPolicy`] maps a 0-based retry attempt to a sleep duration:
//! `first × factor^attempt`, capped at `max`, then randomized by [`JitterPolicy`].
//! The base is derived from the attempt index alone, so jitter never compounds.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::policies::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy::new(Duration::from_millis(50), Duration::from_secs(1))
//!     .with_factor(2.0)
//!     .with_jitter(JitterPolicy::None);
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(50));
//! assert_eq!(backoff.next(2), Duration::from_millis(200));
//! assert_eq!(backoff.next(9), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay schedule used by [`Backoff`](crate::policies::Backoff).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound of any delay.
    pub max: Duration,
    /// Growth per attempt (`1.0` keeps the delay constant).
    pub factor: f64,
    /// Randomization applied to every delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `max = 30s`, `factor = 2.0`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Doubling schedule from `first` up to `max`, without jitter.
    pub fn new(first: Duration, max: Duration) -> Self {
        Self {
            first,
            max,
            ..Self::default()
        }
    }

    /// Sets the growth factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Sets the jitter strategy.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to sleep after the failed attempt `attempt` (0-based).
    pub fn next(&self, attempt: u32) -> Duration {
        let base = self.base(attempt);
        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            other => other.apply(base),
        }
    }

    fn base(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling(first_ms: u64, max_ms: u64) -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_millis(first_ms), Duration::from_millis(max_ms))
    }

    #[test]
    fn test_doubles_until_capped() {
        let policy = doubling(100, 1_000);
        let delays: Vec<u128> = (0..6).map(|a| policy.next(a).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn test_constant_factor() {
        let policy = doubling(250, 30_000).with_factor(1.0);
        assert!((0..20).all(|a| policy.next(a) == Duration::from_millis(250)));
    }

    #[test]
    fn test_first_above_max_is_capped() {
        let policy = doubling(10_000, 5_000);
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_overflowing_attempt_is_capped() {
        let policy = doubling(100, 10_000);
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_full_jitter_stays_below_base() {
        let policy = doubling(100, 30_000).with_jitter(JitterPolicy::Full);
        for attempt in 0..10 {
            assert!(policy.next(attempt) <= policy.base(attempt));
        }
    }

    #[test]
    fn test_equal_jitter_keeps_half() {
        let policy = doubling(1_000, 30_000)
            .with_factor(1.0)
            .with_jitter(JitterPolicy::Equal);
        for attempt in 0..50 {
            let delay = policy.next(attempt);
            assert!(delay >= Duration::from_millis(500), "{delay:?}");
            assert!(delay <= Duration::from_millis(1_000), "{delay:?}");
        }
    }

    #[test]
    fn test_decorrelated_jitter_respects_bounds() {
        let policy = doubling(100, 30_000).with_jitter(JitterPolicy::Decorrelated);
        for _ in 0..100 {
            let delay = policy.next(8);
            assert!(delay >= Duration::from_millis(100), "{delay:?}");
            assert!(delay <= Duration::from_secs(30), "{delay:?}");
        }
    }
}

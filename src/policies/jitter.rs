//! # Randomization of retry delays.
//!
//! Several tick functions failing on the same tick would otherwise retry in lockstep.
//!
//! | Policy                            | Delay for base `d`                     |
//! |-----------------------------------|----------------------------------------|
//! | [`JitterPolicy::None`]            | `d`                                    |
//! | [`JitterPolicy::Full`]            | uniform in `[0, d]`                    |
//! | [`JitterPolicy::Equal`]           | `d/2` + uniform in `[0, d/2]`          |
//! | [`JitterPolicy::Decorrelated`]    | uniform in `[first, min(3·d, max)]`    |

use std::time::Duration;

use rand::Rng;

/// Jitter strategy of a [`BackoffPolicy`](crate::policies::BackoffPolicy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact delays.
    #[default]
    None,
    /// Anywhere between zero and the base delay.
    Full,
    /// At least half of the base delay.
    Equal,
    /// Grows from the first delay towards three times the base, capped at max.
    Decorrelated,
}

impl JitterPolicy {
    /// Randomizes `delay`. [`Decorrelated`](Self::Decorrelated) needs bounds, see
    /// [`apply_decorrelated`](Self::apply_decorrelated); here it returns `delay` unchanged.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = millis(delay);
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full if ms == 0 => Duration::ZERO,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }

    /// Picks a delay in `[floor, min(3·prev, max)]`.
    ///
    /// Other policies fall back to [`apply`](Self::apply) on `prev`.
    pub fn apply_decorrelated(&self, floor: Duration, prev: Duration, max: Duration) -> Duration {
        if *self != JitterPolicy::Decorrelated {
            return self.apply(prev);
        }
        let lo = millis(floor);
        let hi = millis(prev).saturating_mul(3).min(millis(max)).max(lo);
        if lo == hi {
            return floor;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

//! Retry policies and delay schedules.
//!
//! ## Contents
//! - [`RetryPolicy`] whether a failed attempt is followed by another one
//! - [`Attempts`], [`LinearBackoff`], [`Backoff`] built-in policies
//! - [`BackoffPolicy`] exponential delay schedule (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization of those delays
//!
//! ## Wiring
//! ```text
//! with_retry(policy, f)
//!      └─► attempt n fails ─► policy.should_retry(ctx, n, err)
//!                                 ├─ Backoff: sleep(backoff.next(n)), cancellable
//!                                 └─ true ─► attempt n + 1 with ctx.attempt() == n + 1
//! ```

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::{Attempts, Backoff, LinearBackoff, RetryPolicy};

//! # Retry policies for [`with_retry`](crate::decorators::with_retry).
//!
//! A [`RetryPolicy`] is asked after every failed attempt whether to run the
//! function again. It may sleep before answering; the sleep is cut short when the
//! invocation context is cancelled, in which case the answer is "no".
//!
//! | Policy              | Attempts | Delay before attempt `n + 1`        |
//! |---------------------|----------|-------------------------------------|
//! | [`Attempts`]        | `max`    | none                                |
//! | [`LinearBackoff`]   | `max`    | `step × (n + 1)`                    |
//! | [`Backoff`]         | `max`    | [`BackoffPolicy::next`]`(n)`        |
//! | closure             | any      | whatever the closure decides        |
//!
//! The graceful-stop signal is never retried; [`with_retry`](crate::decorators::with_retry)
//! does not consult the policy for it.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::policies::backoff::BackoffPolicy;
use crate::tasks::TickContext;

/// Decides whether a failed attempt is followed by another one.
#[async_trait]
pub trait RetryPolicy: Send + Sync + 'static {
    /// Called after attempt `attempt` (0-based) failed with `err`.
    async fn should_retry(&self, ctx: &TickContext, attempt: u32, err: &TaskError) -> bool;
}

#[async_trait]
impl<F> RetryPolicy for F
where
    F: Fn(&TickContext, u32, &TaskError) -> bool + Send + Sync + 'static,
{
    async fn should_retry(&self, ctx: &TickContext, attempt: u32, err: &TaskError) -> bool {
        self(ctx, attempt, err)
    }
}

/// Runs the function at most `max` times, back to back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempts {
    /// Total number of attempts, the first one included.
    pub max: u32,
}

impl Attempts {
    /// Allows `max` attempts in total.
    pub fn new(max: u32) -> Self {
        Self { max }
    }
}

#[async_trait]
impl RetryPolicy for Attempts {
    async fn should_retry(&self, ctx: &TickContext, attempt: u32, _err: &TaskError) -> bool {
        has_attempts_left(attempt, self.max) && !ctx.is_cancelled()
    }
}

/// Runs the function at most `max` times, sleeping `step × (n + 1)` after failure `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearBackoff {
    /// Total number of attempts, the first one included.
    pub max: u32,
    /// Delay increment per failed attempt.
    pub step: Duration,
}

impl LinearBackoff {
    /// Allows `max` attempts in total, with delays growing by `step`.
    pub fn new(max: u32, step: Duration) -> Self {
        Self { max, step }
    }
}

#[async_trait]
impl RetryPolicy for LinearBackoff {
    async fn should_retry(&self, ctx: &TickContext, attempt: u32, _err: &TaskError) -> bool {
        if !has_attempts_left(attempt, self.max) {
            return false;
        }
        sleep_unless_cancelled(ctx, self.step.saturating_mul(attempt.saturating_add(1))).await
    }
}

/// Runs the function at most `max` times, sleeping per a [`BackoffPolicy`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
    /// Total number of attempts, the first one included.
    pub max: u32,
    /// Delay schedule.
    pub policy: BackoffPolicy,
}

impl Backoff {
    /// Allows `max` attempts in total, with delays from `policy`.
    pub fn new(max: u32, policy: BackoffPolicy) -> Self {
        Self { max, policy }
    }
}

#[async_trait]
impl RetryPolicy for Backoff {
    async fn should_retry(&self, ctx: &TickContext, attempt: u32, err: &TaskError) -> bool {
        if !has_attempts_left(attempt, self.max) {
            return false;
        }
        let delay = self.policy.next(attempt);
        tracing::debug!(attempt, delay = ?delay, error = %err, "backoff scheduled");
        sleep_unless_cancelled(ctx, delay).await
    }
}

fn has_attempts_left(attempt: u32, max: u32) -> bool {
    attempt.saturating_add(1) < max
}

/// Returns `false` if `ctx` is (or becomes) cancelled before `delay` elapses.
async fn sleep_unless_cancelled(ctx: &TickContext, delay: Duration) -> bool {
    if ctx.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        () = ctx.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

//! # Retrying failed invocations.
//!
//! [`with_retry`] re-runs a tick function with the same tick until it succeeds, the
//! [`RetryPolicy`] gives up, or the function asks to stop.

use std::sync::Arc;

use crate::error::TaskError;
use crate::policies::RetryPolicy;
use crate::tasks::{IntoTickFn, TickContext, TickFn};

/// Re-invokes `f` on failure for as long as `policy` allows.
///
/// Attempt `n` (0-based) runs with [`TickContext::attempt`] set to `n`, so nested
/// decorators such as [`with_log`](crate::decorators::with_log) can tell retries apart.
/// The graceful-stop signal ends the invocation at once without asking the policy.
/// The last error is returned when the policy gives up.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tickvisor::decorators::with_retry;
/// use tickvisor::policies::LinearBackoff;
/// use tickvisor::{TickContext, TickFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let f: TickFn<u32> = with_retry(
///     LinearBackoff::new(3, Duration::from_millis(1)),
///     |ctx: TickContext| async move {
///         if ctx.attempt() < 2 {
///             return Err("not yet");
///         }
///         Ok(())
///     },
/// );
/// assert!(f.call(TickContext::default(), 0).await.is_ok());
/// # }
/// ```
pub fn with_retry<T, S, P>(policy: P, f: impl IntoTickFn<T, S>) -> TickFn<T>
where
    T: Clone + Send + 'static,
    P: RetryPolicy,
{
    let policy = Arc::new(policy);
    let f = f.into_tick_fn();
    TickFn::from_fn(move |ctx: TickContext, tick: T| {
        let policy = Arc::clone(&policy);
        let f = f.clone();
        async move {
            let mut attempt = 0;
            loop {
                let err = match f.call(ctx.with_attempt(attempt), tick.clone()).await {
                    Ok(()) => return Ok(()),
                    Err(err) => err,
                };
                if err.is_stopped() || !policy.should_retry(&ctx, attempt, &err).await {
                    return Err::<(), TaskError>(err);
                }
                attempt += 1;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use crate::policies::{Attempts, LinearBackoff};

    fn failing_until(calls: &Arc<AtomicU32>, ok_at: u32) -> TickFn<u32> {
        let calls = Arc::clone(calls);
        TickFn::new(move |ctx: TickContext| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if ctx.attempt() < ok_at {
                    return Err(TaskError::fail(format!("attempt {}", ctx.attempt())));
                }
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let f = with_retry(Attempts::new(3), failing_until(&calls, u32::MAX));

        assert_eq!(
            f.call(TickContext::default(), 0).await,
            Err(TaskError::fail("attempt 2"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_retrying_on_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let f = with_retry(Attempts::new(5), failing_until(&calls, 1));

        assert_eq!(f.call(TickContext::default(), 0).await, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stop_signal_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        let f: TickFn<u32> = with_retry(Attempts::new(5), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(TaskError::stopped("enough")) }
        });

        assert!(f.call(TickContext::default(), 0).await.unwrap_err().is_stopped());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closure_policy_sees_attempt_and_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let asked = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = Arc::clone(&asked);
        let policy = move |_: &TickContext, attempt: u32, err: &TaskError| {
            log.lock().push((attempt, err.to_string()));
            attempt < 1
        };

        let f = with_retry(policy, failing_until(&calls, u32::MAX));
        assert!(f.call(TickContext::default(), 0).await.is_err());
        assert_eq!(
            *asked.lock(),
            vec![
                (0, "execution failed: attempt 0".to_string()),
                (1, "execution failed: attempt 1".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_linear_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let f = with_retry(
            LinearBackoff::new(10, Duration::from_secs(60)),
            failing_until(&calls, u32::MAX),
        );

        let ctx = TickContext::default();
        let token = ctx.token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(90)).await;
            token.cancel();
        });

        assert!(f.call(ctx, 0).await.is_err());
        // Attempt 0, sleep 60s, attempt 1, cancelled during the 120s sleep.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

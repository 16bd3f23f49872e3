//! Per-invocation deadlines.

use std::time::Duration;

use tokio::time;

use crate::error::TaskError;
use crate::tasks::{IntoTickFn, TickContext, TickFn};

/// Bounds every invocation of `f` by `timeout`.
///
/// The function runs with a child context that is cancelled when the invocation ends.
/// If the deadline passes first, the invocation is abandoned and
/// [`TaskError::Timeout`] is returned.
pub fn with_timeout<T, S>(timeout: Duration, f: impl IntoTickFn<T, S>) -> TickFn<T>
where
    T: Send + 'static,
{
    let f = f.into_tick_fn();
    TickFn::from_fn(move |ctx: TickContext, tick: T| {
        let child = ctx.child();
        let call = f.call(child.clone(), tick);
        async move {
            let _cancel_on_exit = child.token().clone().drop_guard();
            match time::timeout(timeout, call).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::debug!(timeout = ?timeout, "invocation timed out");
                    Err(TaskError::Timeout { timeout })
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    fn sleeper(d: Duration) -> TickFn<()> {
        TickFn::new(move || async move {
            time::sleep(d).await;
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_invocation_times_out() {
        let f = with_timeout(Duration::from_secs(1), sleeper(Duration::from_secs(5)));
        let start = time::Instant::now();

        assert_eq!(
            f.call(TickContext::default(), ()).await,
            Err(TaskError::Timeout {
                timeout: Duration::from_secs(1)
            })
        );
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_invocation_passes_through() {
        let f = with_timeout(Duration::from_secs(1), sleeper(Duration::from_millis(10)));
        assert_eq!(f.call(TickContext::default(), ()).await, Ok(()));

        let failing: TickFn<()> = with_timeout(Duration::from_secs(1), || async {
            Err::<(), _>(TaskError::fail("inner"))
        });
        assert_eq!(
            failing.call(TickContext::default(), ()).await,
            Err(TaskError::fail("inner"))
        );
    }

    #[tokio::test]
    async fn test_child_context_cancelled_after_call() {
        let captured: Arc<Mutex<Option<TickContext>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&captured);
        let f: TickFn<()> = with_timeout(Duration::from_secs(1), move |ctx: TickContext| {
            *slot.lock() = Some(ctx);
            async {}
        });

        let parent = TickContext::default();
        f.call(parent.clone(), ()).await.unwrap();

        let child = captured.lock().take().unwrap();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}

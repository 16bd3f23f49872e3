//! Composition of tick functions: running several in order, swallowing errors.

use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::{IntoTickFn, TickContext, TickFn};

/// Runs `fns` in order on every tick, stopping at the first error.
///
/// An empty sequence always succeeds.
pub fn sequence<T>(fns: impl IntoIterator<Item = TickFn<T>>) -> TickFn<T>
where
    T: Clone + Send + 'static,
{
    let fns: Arc<[TickFn<T>]> = fns.into_iter().collect();
    TickFn::from_fn(move |ctx: TickContext, tick: T| {
        let fns = Arc::clone(&fns);
        async move {
            for f in fns.iter() {
                f.call(ctx.clone(), tick.clone()).await?;
            }
            Ok::<(), TaskError>(())
        }
    })
}

/// Reports success whatever `f` returns.
pub fn ignore_error<T, S>(f: impl IntoTickFn<T, S>) -> TickFn<T>
where
    T: Send + 'static,
{
    let f = f.into_tick_fn();
    TickFn::from_fn(move |ctx: TickContext, tick: T| {
        let call = f.call(ctx, tick);
        async move {
            if let Err(err) = call.await {
                tracing::trace!(error = %err, "error ignored");
            }
            Ok::<(), TaskError>(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str, fails: bool) -> TickFn<u32> {
        let log = Arc::clone(log);
        TickFn::new(move |tick: u32| {
            log.lock().push(format!("{name}:{tick}"));
            async move {
                if fails {
                    return Err(TaskError::fail(name));
                }
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_sequence_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let seq = sequence([recorder(&log, "a", false), recorder(&log, "b", false)]);

        assert_eq!(seq.call(TickContext::default(), 7).await, Ok(()));
        assert_eq!(*log.lock(), vec!["a:7", "b:7"]);
    }

    #[tokio::test]
    async fn test_sequence_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let seq = sequence([
            recorder(&log, "a", false),
            recorder(&log, "b", true),
            recorder(&log, "c", false),
        ]);

        assert_eq!(
            seq.call(TickContext::default(), 1).await,
            Err(TaskError::fail("b"))
        );
        assert_eq!(*log.lock(), vec!["a:1", "b:1"]);
    }

    #[tokio::test]
    async fn test_empty_sequence_succeeds() {
        let seq = sequence(Vec::<TickFn<u32>>::new());
        assert_eq!(seq.call(TickContext::default(), 0).await, Ok(()));
    }

    #[tokio::test]
    async fn test_ignore_error() {
        let f = ignore_error(|| async { Err::<(), _>(TaskError::stopped("even this")) });
        let f: TickFn<()> = f;
        assert_eq!(f.call(TickContext::default(), ()).await, Ok(()));
    }
}

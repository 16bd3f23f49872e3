//! Concurrency guards: mutual exclusion and single flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use tokio::sync::Mutex;

use crate::error::TaskError;
use crate::tasks::{BoxTickFuture, IntoTickFn, TickContext, TickFn};

/// Serializes invocations of `f` behind `lock`.
///
/// Sharing one lock between several decorated functions serializes all of them.
pub fn with_lock<T, S>(lock: Arc<Mutex<()>>, f: impl IntoTickFn<T, S>) -> TickFn<T>
where
    T: Send + 'static,
{
    let f = f.into_tick_fn();
    TickFn::from_fn(move |ctx: TickContext, tick: T| {
        let lock = Arc::clone(&lock);
        let f = f.clone();
        async move {
            let _guard = lock.lock().await;
            f.call(ctx, tick).await
        }
    })
}

/// Skips an invocation (reporting success) while the previous one is still running.
///
/// The check happens when the invocation is made, never waits.
pub fn no_overlap<T, S>(f: impl IntoTickFn<T, S>) -> TickFn<T>
where
    T: Send + 'static,
{
    let f = f.into_tick_fn();
    let running = Arc::new(AtomicBool::new(false));
    TickFn::from_fn(move |ctx: TickContext, tick: T| -> BoxTickFuture {
        if running.swap(true, Ordering::AcqRel) {
            tracing::trace!("invocation skipped, previous one still running");
            return futures::future::ready(Ok::<(), TaskError>(())).boxed();
        }
        let flight = InFlight(Arc::clone(&running));
        let call = f.call(ctx, tick);
        async move {
            let _flight = flight;
            call.await
        }
        .boxed()
    })
}

/// Clears the running flag when the invocation completes or is dropped.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

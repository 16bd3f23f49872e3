//! # Consumption loop: run a tick function over a tick sequence.
//!
//! [`on_tick`] pulls ticks from one subscription and invokes the function for each.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► ticks.next() ──► None ───────────────► return Ok(())
//!   └─► f(ctx, tick)
//!         ├─ Ok(())              ─► acknowledge, continue
//!         ├─ Err(Stopped { .. }) ─► end subscription, return the stop signal
//!         └─ Err(other)          ─► end subscription, return the failure
//! }
//! on exit: the loop context is cancelled
//! ```
//!
//! ## Rules
//! - Every invocation gets a child of the loop context; an invocation cancelling its own
//!   context does not affect the loop.
//! - Ending the loop drops the subscription, which acknowledges the last tick and
//!   tells the producer to stop delivering.

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::{IntoTickFn, TickContext};
use crate::ticker::Ticks;

/// Invokes `f` on every tick of `ticks` until the sequence ends or `f` fails.
///
/// Returns `Ok(())` when the producer closed the subscription, otherwise the error
/// that ended the loop (the graceful-stop signal included).
///
/// # Example
/// ```rust
/// use tickvisor::{Ticker, TaskError, on_tick};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ticker = Ticker::<u32>::new();
///     let ticks = ticker.subscribe();
///
///     let producer = ticker.clone();
///     tokio::spawn(async move {
///         for tick in 0..10 {
///             producer.tick(tick).wait().await;
///         }
///     });
///
///     let res = on_tick(ticks, |tick: u32| async move {
///         if tick == 3 {
///             return Err(TaskError::stopped("tick 3"));
///         }
///         Ok(())
///     })
///     .await;
///     assert!(res.unwrap_err().is_stopped());
/// }
/// ```
pub async fn on_tick<T, S>(mut ticks: Ticks<T>, f: impl IntoTickFn<T, S>) -> Result<(), TaskError>
where
    T: Send + 'static,
{
    let f = f.into_tick_fn();
    let token = CancellationToken::new();
    let _cancel_on_exit = token.clone().drop_guard();
    let ctx = TickContext::new(token);

    while let Some(tick) = ticks.next().await {
        if let Err(err) = f.call(ctx.child(), tick).await {
            if err.is_stopped() {
                tracing::debug!(error = %err, "tick loop stopped");
            } else {
                tracing::debug!(error = %err, "tick loop failed");
            }
            return Err(err);
        }
    }
    Ok(())
}

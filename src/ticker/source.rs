//! # Tick source abstraction consumed by [`Task`](crate::Task).

use async_trait::async_trait;

use crate::ticker::broadcaster::Ticker;
use crate::ticker::consumer::Ticks;

/// Anything that hands out tick subscriptions and can be stopped.
///
/// Implemented by [`Ticker`] and [`TimeTicker`](crate::TimeTicker).
#[async_trait]
pub trait TickSource<T>: Send + Sync + 'static {
    /// Registers a new subscriber.
    fn subscribe(&self) -> Ticks<T>;

    /// Stops the source and releases every subscriber.
    async fn stop(&self);
}

#[async_trait]
impl<T: Clone + Send + 'static> TickSource<T> for Ticker<T> {
    fn subscribe(&self) -> Ticks<T> {
        Ticker::subscribe(self)
    }

    async fn stop(&self) {
        Ticker::stop(self);
    }
}

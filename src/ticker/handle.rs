//! # Wait handle for a single dispatched tick.

use tokio_util::task::TaskTracker;

/// Completion handle returned by [`Ticker::tick`](crate::Ticker::tick).
///
/// [`wait`](Self::wait) resolves once every consumer registered at dispatch time
/// acknowledged the tick, or was closed, or had already finished reading.
#[derive(Clone, Debug)]
#[must_use = "a tick handle does nothing unless waited on; drop it explicitly to fire and forget"]
pub struct TickHandle {
    deliveries: TaskTracker,
}

impl TickHandle {
    pub(crate) fn new(deliveries: TaskTracker) -> Self {
        deliveries.close();
        Self { deliveries }
    }

    /// Waits until all deliveries of this tick have resolved.
    pub async fn wait(&self) {
        self.deliveries.wait().await;
    }

    /// Number of deliveries still in flight.
    pub fn pending(&self) -> usize {
        self.deliveries.len()
    }

    /// Returns `true` when nothing is left to wait for.
    pub fn is_done(&self) -> bool {
        self.deliveries.is_empty()
    }
}

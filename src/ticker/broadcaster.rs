//! # Tick broadcaster: fan-out with per-consumer acknowledgement.
//!
//! [`Ticker`] owns a growable set of [`Consumer`]s keyed by a monotonically increasing
//! subscription id. Each [`Ticker::tick`] hands the value to every consumer registered
//! at that moment, concurrently, and returns a [`TickHandle`] that resolves once all of
//! them processed it.
//!
//! ## Architecture
//! ```text
//! tick(v)
//!     │
//!     ├──► consumer 1 ──► send(v) ──► [delivery task] ──► ack / closed / dropped
//!     ├──► consumer 2 ──► send(v) ──► [delivery task] ──► ack / closed / dropped
//!     └──► consumer N ──► send(v) ──► [delivery task] ──► ack / closed / dropped
//!                                            │
//!                          TickHandle (this tick) + in-flight tracker (all ticks)
//! ```
//!
//! ## Rules
//! - **Not retroactive**: a subscription only sees ticks dispatched after it was made.
//! - **No cross-consumer ordering**: consumer A may process tick N while B processes N+1.
//! - **Per-consumer FIFO**: each consumer sees ticks in dispatch order.
//! - **Stop is one-way**: stopping closes every registered consumer; in-flight
//!   deliveries to them resolve as `Closed`.
//!
//! ## Example
//! ```rust
//! use tickvisor::Ticker;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ticker = Ticker::<i32>::new();
//!     let mut ticks = ticker.subscribe();
//!
//!     let reader = tokio::spawn(async move {
//!         let mut sum = 0;
//!         while let Some(v) = ticks.next().await {
//!             sum += v;
//!         }
//!         sum
//!     });
//!
//!     for v in [1, 2, 3] {
//!         ticker.tick(v).wait().await;
//!     }
//!     ticker.stop();
//!     assert_eq!(reader.await.unwrap(), 6);
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio_util::task::TaskTracker;

use crate::ticker::consumer::{self, Consumer, Ticks};
use crate::ticker::handle::TickHandle;

struct Shared<T> {
    next_id: AtomicU64,
    consumers: RwLock<HashMap<u64, Consumer<T>>>,
    inflight: TaskTracker,
}

/// Manual tick broadcaster.
///
/// Cheap to clone: clones share the same consumer set.
pub struct Ticker<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Ticker<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Ticker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Ticker<T> {
    /// Creates a broadcaster without subscribers.
    pub fn new() -> Self {
        let inflight = TaskTracker::new();
        // Closed once so that `wait_all` resolves whenever nothing is in flight.
        inflight.close();
        Self {
            shared: Arc::new(Shared {
                next_id: AtomicU64::new(0),
                consumers: RwLock::new(HashMap::new()),
                inflight,
            }),
        }
    }

    /// Registers a new consumer and returns its tick sequence.
    pub fn subscribe(&self) -> Ticks<T> {
        let (consumer, ticks) = consumer::channel();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.shared.consumers.write().insert(id, consumer);
        tracing::debug!(consumer = id, "tick consumer subscribed");
        ticks
    }

    /// Dispatches `value` to every registered consumer.
    ///
    /// Must be called within a tokio runtime: each delivery runs on its own task.
    pub fn tick(&self, value: T) -> TickHandle {
        self.prune_finished();

        let deliveries = TaskTracker::new();
        {
            let consumers = self.shared.consumers.read();
            for consumer in consumers.values() {
                let delivery = consumer.send(value.clone());
                let inflight = self.shared.inflight.token();
                deliveries.spawn(async move {
                    delivery.await;
                    drop(inflight);
                });
            }
        }
        TickHandle::new(deliveries)
    }

    /// Closes and unregisters every consumer.
    ///
    /// Safe to call concurrently with [`tick`](Self::tick) and more than once.
    pub fn stop(&self) {
        let drained: Vec<(u64, Consumer<T>)> = self.shared.consumers.write().drain().collect();
        if drained.is_empty() {
            return;
        }
        for (_, consumer) in &drained {
            consumer.close();
        }
        tracing::debug!(consumers = drained.len(), "ticker stopped");
    }

    /// Waits until every delivery of every past tick has resolved.
    pub async fn wait_all(&self) {
        self.shared.inflight.wait().await;
    }

    /// Number of registered consumers.
    pub fn consumers(&self) -> usize {
        self.shared.consumers.read().len()
    }

    /// Unregisters consumers whose reader already finished.
    fn prune_finished(&self) {
        let finished = self.shared.consumers.read().values().any(Consumer::is_done);
        if finished {
            self.shared.consumers.write().retain(|id, consumer| {
                let keep = !consumer.is_done();
                if !keep {
                    tracing::debug!(consumer = *id, "tick consumer finished");
                }
                keep
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;
    use std::time::Duration;

    async fn tick_in_range(ticker: Ticker<i32>, n: i32) {
        for tick in 0..n {
            let _ = ticker.tick(tick);
        }
        ticker.wait_all().await;
        ticker.stop();
    }

    #[tokio::test]
    async fn test_full_manual() {
        let ticker = Ticker::<i32>::new();
        let mut ticks = ticker.subscribe();
        let sum = Arc::new(AtomicI32::new(0));

        let seen = Arc::clone(&sum);
        let reader = tokio::spawn(async move {
            while let Some(tick) = ticks.next().await {
                seen.fetch_add(tick, Ordering::SeqCst);
            }
        });

        for i in 0..3 {
            ticker.tick(i).wait().await;
        }
        assert_eq!(sum.load(Ordering::SeqCst), 3);

        ticker.stop();
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn test_ticks_before_subscription_are_not_observed() {
        let ticker = Ticker::<i32>::new();
        for i in 0..5 {
            ticker.tick(i).wait().await;
        }

        let ticks = ticker.subscribe();
        let reader = tokio::spawn(async move {
            use futures::StreamExt;
            ticks.into_stream().collect::<Vec<_>>().await
        });
        ticker.tick(42).wait().await;
        ticker.stop();

        assert_eq!(reader.await.unwrap(), vec![42]);
    }

    #[tokio::test]
    async fn test_wait_covers_every_consumer() {
        let ticker = Ticker::<i32>::new();
        let processed = Arc::new(AtomicI32::new(0));

        for delay in [5u64, 15, 30] {
            let mut ticks = ticker.subscribe();
            let seen = Arc::clone(&processed);
            tokio::spawn(async move {
                while ticks.next().await.is_some() {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let handle = ticker.tick(1);
        handle.wait().await;
        assert!(handle.is_done());
        assert_eq!(processed.load(Ordering::SeqCst), 3);
        ticker.stop();
    }

    #[tokio::test]
    async fn test_stop_during_dispatch_resolves_handle() {
        let ticker = Ticker::<i32>::new();
        // Subscribed but never read: the delivery can only resolve through stop.
        let _idle = ticker.subscribe();

        let handle = ticker.tick(1);
        assert_eq!(handle.pending(), 1);

        ticker.stop();
        handle.wait().await;
        ticker.wait_all().await;
        assert_eq!(ticker.consumers(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let ticker = Ticker::<i32>::new();
        let mut ticks = ticker.subscribe();
        ticker.stop();
        ticker.stop();
        assert_eq!(ticks.next().await, None);
        ticker.tick(1).wait().await;
    }

    #[tokio::test]
    async fn test_finished_consumers_are_pruned() {
        let ticker = Ticker::<i32>::new();
        let ticks = ticker.subscribe();
        let _live = ticker.subscribe();
        assert_eq!(ticker.consumers(), 2);

        drop(ticks);
        let _ = ticker.tick(1);
        assert_eq!(ticker.consumers(), 1);
        ticker.stop();
    }

    #[tokio::test]
    async fn test_wait_all_drains_unawaited_ticks() {
        let ticker = Ticker::<i32>::new();
        let mut ticks = ticker.subscribe();
        let sum = Arc::new(AtomicI32::new(0));

        let seen = Arc::clone(&sum);
        let reader = tokio::spawn(async move {
            while let Some(tick) = ticks.next().await {
                seen.fetch_add(tick, Ordering::SeqCst);
            }
        });

        tick_in_range(ticker.clone(), 4).await;
        reader.await.unwrap();
        assert_eq!(sum.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_order_per_consumer_under_parallel_dispatch() {
        let ticker = Ticker::<u32>::new();
        let mut readers = Vec::new();
        for _ in 0..3 {
            let ticks = ticker.subscribe();
            readers.push(tokio::spawn(async move {
                use futures::StreamExt;
                ticks.into_stream().collect::<Vec<_>>().await
            }));
        }

        for tick in 0..50 {
            let _ = ticker.tick(tick);
        }
        ticker.wait_all().await;
        ticker.stop();

        for reader in readers {
            assert_eq!(reader.await.unwrap(), (0..50).collect::<Vec<_>>());
        }
    }
}

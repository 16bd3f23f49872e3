//! # Per-subscriber pipe with a synchronous tick/acknowledge handshake.
//!
//! [`channel`] creates the two halves of one subscription:
//! - [`Consumer`] the writer half, owned by the broadcaster;
//! - [`Ticks`] the reader half, handed to the subscriber.
//!
//! ## Handshake
//! ```text
//! Consumer::send(v) ──► [unbounded queue] ──► Ticks::next() → Some(v)
//!        ▲                                          │
//!        └──────────── ack (oneshot) ◄──────────────┘ on the next `next()` or drop
//! ```
//!
//! ## Rules
//! - Exactly one [`SendOutcome`] per send: acknowledged, closed or dropped.
//! - A send never blocks forever: it races the acknowledgement against the
//!   "closed by owner" and "done by reader" signals.
//! - Values are enqueued when `send` is called, so one consumer observes values in send order.
//! - Once the reader is done, the consumer never accepts another value.
//! - Once closed, no further value is handed to the reader.

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use futures::stream::{self, Stream};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// How a single [`Consumer::send`] resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reader received the value and acknowledged it.
    Acknowledged,
    /// The consumer was closed by its owner before the value was acknowledged.
    Closed,
    /// The reader had already finished; the value was dropped.
    Dropped,
}

/// One value in flight together with its acknowledgement slot.
struct Delivery<T> {
    value: T,
    ack: oneshot::Sender<()>,
}

/// Creates a connected writer/reader pair.
pub fn channel<T: Send + 'static>() -> (Consumer<T>, Ticks<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let closed = CancellationToken::new();
    let done = CancellationToken::new();
    let consumer = Consumer {
        tx,
        closed: closed.clone(),
        done: done.clone(),
    };
    let ticks = Ticks {
        rx,
        closed,
        done,
        pending: None,
    };
    (consumer, ticks)
}

/// Writer half of a subscription.
pub struct Consumer<T> {
    tx: mpsc::UnboundedSender<Delivery<T>>,
    closed: CancellationToken,
    done: CancellationToken,
}

impl<T: Send + 'static> Consumer<T> {
    /// Hands `value` to the reader and resolves once the reader acknowledged it,
    /// the consumer got closed, or the reader finished.
    ///
    /// The value is queued before this returns; only the wait is deferred to the future.
    pub fn send(&self, value: T) -> BoxFuture<'static, SendOutcome> {
        if self.done.is_cancelled() {
            return future::ready(SendOutcome::Dropped).boxed();
        }
        if self.closed.is_cancelled() {
            return future::ready(SendOutcome::Closed).boxed();
        }

        let (ack, acked) = oneshot::channel();
        if self.tx.send(Delivery { value, ack }).is_err() {
            return future::ready(SendOutcome::Dropped).boxed();
        }

        let closed = self.closed.clone();
        let done = self.done.clone();
        async move {
            tokio::select! {
                biased;
                res = acked => match res {
                    Ok(()) => SendOutcome::Acknowledged,
                    Err(_) => SendOutcome::Dropped,
                },
                () = closed.cancelled() => SendOutcome::Closed,
                () = done.cancelled() => SendOutcome::Dropped,
            }
        }
        .boxed()
    }
}

impl<T> Consumer<T> {
    /// Signals that no further values will be handed to the reader.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Returns `true` once [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Returns `true` once the reader finished (ended or dropped its [`Ticks`]).
    pub fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }
}

/// Reader half of a subscription: a lazy, single-pass sequence of ticks.
///
/// Each value returned by [`next`](Self::next) is acknowledged when the next value is
/// requested or when the sequence is dropped, whichever comes first.
pub struct Ticks<T> {
    rx: mpsc::UnboundedReceiver<Delivery<T>>,
    closed: CancellationToken,
    done: CancellationToken,
    pending: Option<oneshot::Sender<()>>,
}

impl<T> Ticks<T> {
    /// Acknowledges the previous value and waits for the next one.
    ///
    /// Returns `None` when the owner closed the subscription or the producer went away.
    /// After `None` the sequence is exhausted.
    pub async fn next(&mut self) -> Option<T> {
        self.acknowledge();
        if self.done.is_cancelled() {
            return None;
        }

        let delivery = tokio::select! {
            biased;
            () = self.closed.cancelled() => None,
            d = self.rx.recv() => d,
        };

        match delivery {
            Some(Delivery { value, ack }) => {
                self.pending = Some(ack);
                Some(value)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    /// Returns `true` once the sequence is exhausted.
    pub fn is_finished(&self) -> bool {
        self.done.is_cancelled()
    }

    fn acknowledge(&mut self) {
        if let Some(ack) = self.pending.take() {
            let _ = ack.send(());
        }
    }

    fn finish(&mut self) {
        self.done.cancel();
        self.rx.close();
    }
}

impl<T: Send + 'static> Ticks<T> {
    /// Adapts the sequence into a [`Stream`].
    ///
    /// Dropping the stream early ends the subscription like dropping `Ticks` does.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static {
        stream::unfold(self, |mut ticks| async move {
            let value = ticks.next().await?;
            Some((value, ticks))
        })
    }
}

impl<T> Drop for Ticks<T> {
    fn drop(&mut self) {
        self.acknowledge();
        self.finish();
    }
}

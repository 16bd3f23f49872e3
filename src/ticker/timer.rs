//! # Periodic timer built on the tick broadcaster.
//!
//! [`TimeTicker`] is a [`Ticker`] of [`Instant`]s driven by an internal clock.
//!
//! ## State machine
//! ```text
//!            start() / subscribe() / reset(d != 0)
//!   Idle ─────────────────────────────────────────► Running ──┐
//!    ▲                                                │   ▲   │ reset(d != 0):
//!    └──────────── reset(0) / stop() ─────────────────┘   └───┘ new period from now
//! ```
//!
//! ## Rules
//! - A running loop ticks once immediately, then once per elapsed period.
//! - `Duration::ZERO` means "not running": a timer built with it stays idle until
//!   the first non-zero [`reset`](TimeTicker::reset).
//! - The last non-zero period is remembered, so [`start`](TimeTicker::start) after
//!   `reset(0)` resumes with it.
//! - [`subscribe`](TimeTicker::subscribe) is the only implicit transition: it starts an idle timer.
//! - [`stop`](TimeTicker::stop) halts the clock and closes every subscriber.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::TimeTicker;
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() {
//!     let timer = TimeTicker::new(Duration::from_secs(1));
//!     let mut ticks = timer.subscribe();
//!
//!     let stopper = timer.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(2500)).await;
//!         stopper.stop().await;
//!     });
//!
//!     let mut count = 0;
//!     while ticks.next().await.is_some() {
//!         count += 1;
//!     }
//!     assert_eq!(count, 3);
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ticker::broadcaster::Ticker;
use crate::ticker::consumer::Ticks;
use crate::ticker::handle::TickHandle;
use crate::ticker::source::TickSource;

/// One run of the dispatch loop.
struct Session {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Session {
    fn is_alive(&self) -> bool {
        !self.token.is_cancelled() && !self.join.is_finished()
    }
}

struct TimerShared {
    ticker: Ticker<Instant>,
    period: watch::Sender<Duration>,
    session: Mutex<Option<Session>>,
}

impl Drop for TimerShared {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.token.cancel();
        }
    }
}

/// Broadcaster of [`Instant`]s ticking on a resettable period.
///
/// Cheap to clone: clones drive the same clock and subscriber set.
#[derive(Clone)]
pub struct TimeTicker {
    shared: Arc<TimerShared>,
}

impl TimeTicker {
    /// Creates an idle timer with the given period.
    ///
    /// The clock starts on the first [`subscribe`](Self::subscribe) or [`start`](Self::start).
    pub fn new(period: Duration) -> Self {
        let (period, _) = watch::channel(period);
        Self {
            shared: Arc::new(TimerShared {
                ticker: Ticker::new(),
                period,
                session: Mutex::new(None),
            }),
        }
    }

    /// Registers a new subscriber and starts the clock if it is idle.
    pub fn subscribe(&self) -> Ticks<Instant> {
        let ticks = self.shared.ticker.subscribe();
        self.start();
        ticks
    }

    /// Starts the dispatch loop unless it is already running.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&self) {
        if self.period().is_zero() {
            return;
        }
        let mut session = self.shared.session.lock();
        if session.as_ref().is_some_and(Session::is_alive) {
            return;
        }

        let token = CancellationToken::new();
        let join = tokio::spawn(run(
            self.shared.ticker.clone(),
            self.shared.period.subscribe(),
            token.clone(),
        ));
        *session = Some(Session { token, join });
    }

    /// Changes the period of the running and future dispatch loops.
    ///
    /// A non-zero period restarts the schedule from now (and starts an idle timer).
    /// `Duration::ZERO` halts the loop and waits for it to exit; on an idle timer it is a no-op.
    pub async fn reset(&self, period: Duration) {
        if period.is_zero() {
            self.halt().await;
            return;
        }
        self.shared.period.send_replace(period);
        self.start();
    }

    /// Halts the clock and closes every subscriber.
    pub async fn stop(&self) {
        self.halt().await;
        self.shared.ticker.stop();
    }

    /// Returns `true` while the dispatch loop is alive.
    pub fn is_running(&self) -> bool {
        self.shared
            .session
            .lock()
            .as_ref()
            .is_some_and(Session::is_alive)
    }

    /// Returns the current period (`Duration::ZERO` if never set).
    pub fn period(&self) -> Duration {
        *self.shared.period.borrow()
    }

    /// Dispatches a tick manually, outside of the clock.
    pub fn tick(&self, at: Instant) -> TickHandle {
        self.shared.ticker.tick(at)
    }

    /// Waits until every dispatched tick has been processed.
    pub async fn wait_all(&self) {
        self.shared.ticker.wait_all().await;
    }

    async fn halt(&self) {
        let session = self.shared.session.lock().take();
        if let Some(Session { token, join }) = session {
            token.cancel();
            let _ = join.await;
        }
    }
}

#[async_trait]
impl TickSource<Instant> for TimeTicker {
    fn subscribe(&self) -> Ticks<Instant> {
        TimeTicker::subscribe(self)
    }

    async fn stop(&self) {
        TimeTicker::stop(self).await;
    }
}

fn schedule(every: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run(
    ticker: Ticker<Instant>,
    mut period: watch::Receiver<Duration>,
    token: CancellationToken,
) {
    let every = *period.borrow_and_update();
    if every.is_zero() {
        return;
    }
    tracing::debug!(period = ?every, "timer started");

    let _ = ticker.tick(Instant::now());
    let mut interval = schedule(every);
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            changed = period.changed() => {
                if changed.is_err() {
                    break;
                }
                let every = *period.borrow_and_update();
                if every.is_zero() {
                    break;
                }
                tracing::debug!(period = ?every, "timer period reset");
                interval = schedule(every);
            }
            at = interval.tick() => {
                let _ = ticker.tick(at);
            }
        }
    }
    tracing::debug!("timer halted");
}

//! # Task: a tick function bound to a tick source, with start/stop control.
//!
//! A [`Task`] subscribes to its [`TickSource`] on the first start and runs the
//! consumption loop ([`on_tick`]) on a tokio task. Stopping only closes a gate in
//! front of the function: ticks keep being acknowledged but no longer reach it.
//!
//! ## States
//! ```text
//!                 start()                         stop() / pause()
//!   Idle ─────────────────────────► Running ─────────────────────────► Paused
//!    ▲      (subscribe + launch)      ▲                                  │
//!    │                                └──────────── start() ─────────────┘
//!    │                                         (same session)
//!    └──── stop() with source stop: the source closes the subscription ────
//! ```
//!
//! ## Rules
//! - [`start`](Task::start) is idempotent; the `on_start` hook may veto it with
//!   [`TaskError::Stopped`].
//! - At most one consumption loop per session; a restart within a session reuses it.
//! - A tick delivered while the task is not running is acknowledged without calling
//!   the function, so producers waiting on [`TickHandle`](crate::TickHandle)s never block.
//! - With [`TaskOptions::with_source_stop`], [`stop`](Task::stop) also stops the source
//!   and the next start opens a new session that only sees ticks emitted after it.
//! - A loop that ends on its own (the function returned an error or the stop signal,
//!   or the source was stopped elsewhere) returns the task to `Idle`; the next start
//!   opens a new session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::core::options::TaskOptions;
use crate::core::runner::on_tick;
use crate::error::TaskError;
use crate::tasks::{BoxTickFuture, IntoTickFn, TickContext, TickFn};
use crate::ticker::TickSource;

/// Observable lifecycle state of a [`Task`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// No consumption loop is alive.
    Idle,
    /// The loop is alive but ticks do not reach the function.
    Paused,
    /// Ticks reach the function.
    Running,
}

/// Slot of the current consumption loop.
#[derive(Default)]
struct Session {
    id: u64,
    join: Option<JoinHandle<()>>,
}

impl Session {
    fn is_alive(&self) -> bool {
        self.join.as_ref().is_some_and(|join| !join.is_finished())
    }
}

/// Run flag and session slot, shared with the consumption loop.
#[derive(Default)]
struct Control {
    started: AtomicBool,
    session: Mutex<Session>,
}

impl Control {
    /// Marks session `id` as over: the task no longer runs and the next start relaunches.
    ///
    /// No-op once a newer session has replaced it.
    fn end_session(&self, id: u64) {
        let mut session = self.session.lock();
        if session.id == id {
            self.started.store(false, Ordering::SeqCst);
            session.join = None;
        }
    }
}

struct TaskInner<T> {
    source: Arc<dyn TickSource<T>>,
    func: TickFn<T>,
    options: TaskOptions,
    control: Arc<Control>,
}

/// Start/stop controllable consumer of a tick source.
///
/// Cheap to clone: clones control the same task, so a clone may be moved into the
/// tick function itself.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use tickvisor::{Task, Ticker};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ticker = Ticker::<u32>::new();
///     let sum = Arc::new(AtomicU32::new(0));
///
///     let seen = Arc::clone(&sum);
///     let task = Task::new(ticker.clone(), move |tick: u32| {
///         let seen = Arc::clone(&seen);
///         async move {
///             seen.fetch_add(tick, Ordering::SeqCst);
///         }
///     });
///
///     task.start();
///     ticker.tick(1).wait().await;
///     task.stop().await;
///     ticker.tick(10).wait().await;
///
///     assert_eq!(sum.load(Ordering::SeqCst), 1);
/// }
/// ```
pub struct Task<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> Task<T> {
    /// Binds `f` to `source` with default options.
    pub fn new<S>(source: impl TickSource<T>, f: impl IntoTickFn<T, S>) -> Self {
        Self::with_options(source, f, TaskOptions::default())
    }

    /// Binds `f` to `source` with the given options.
    pub fn with_options<S>(
        source: impl TickSource<T>,
        f: impl IntoTickFn<T, S>,
        options: TaskOptions,
    ) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                source: Arc::new(source),
                func: f.into_tick_fn(),
                options,
                control: Arc::new(Control::default()),
            }),
        }
    }

    /// Lets ticks reach the function, launching the consumption loop if none is alive.
    ///
    /// The subscription is made before returning, so every tick emitted afterwards is seen.
    /// Must be called within a tokio runtime.
    pub fn start(&self) {
        let inner = &self.inner;
        let control = &inner.control;
        if control.started.load(Ordering::SeqCst) {
            return;
        }
        if let Some(hook) = &inner.options.on_start {
            match hook() {
                Ok(()) => {}
                Err(err) if err.is_stopped() => {
                    tracing::info!(task = %inner.options.name, reason = %err, "start aborted by hook");
                    return;
                }
                Err(err) => {
                    tracing::warn!(task = %inner.options.name, error = %err, "start hook failed");
                }
            }
        }

        let mut session = control.session.lock();
        if control.started.swap(true, Ordering::SeqCst) {
            return;
        }
        if session.is_alive() {
            tracing::debug!(task = %inner.options.name, "task resumed");
            return;
        }

        session.id += 1;
        let id = session.id;
        let ticks = inner.source.subscribe();
        let gated = gate(Arc::clone(control), id, inner.func.clone());
        let control = Arc::clone(control);
        let name = inner.options.name.clone();
        session.join = Some(tokio::spawn(async move {
            tracing::debug!(task = %name, "task session started");
            match on_tick(ticks, gated).await {
                Ok(()) => tracing::debug!(task = %name, "task session ended"),
                Err(err) if err.is_stopped() => {
                    tracing::info!(task = %name, reason = %err, "task session stopped");
                }
                Err(err) => {
                    tracing::warn!(task = %name, error = %err, "task session failed");
                }
            }
            control.end_session(id);
        }));
    }

    /// Stops ticks from reaching the function.
    ///
    /// Stops the tick source as well when configured with
    /// [`TaskOptions::with_source_stop`], then runs the `on_stop` hook.
    /// No-op if the task is not started.
    pub async fn stop(&self) {
        let inner = &self.inner;
        if !inner.control.started.swap(false, Ordering::SeqCst) {
            return;
        }
        if inner.options.stop_source {
            // Detached: the loop exits once the source closes the subscription, and it
            // may be the caller of this very method.
            let _ = inner.control.session.lock().join.take();
            inner.source.stop().await;
        }
        if let Some(hook) = &inner.options.on_stop {
            hook();
        }
        tracing::debug!(task = %inner.options.name, "task stopped");
    }

    /// Stops ticks from reaching the function without touching the source or hooks.
    pub fn pause(&self) {
        if self.inner.control.started.swap(false, Ordering::SeqCst) {
            tracing::debug!(task = %self.inner.options.name, "task paused");
        }
    }

    /// Returns `true` while ticks reach the function.
    ///
    /// Turns `false` on its own once the consumption loop ends.
    pub fn is_started(&self) -> bool {
        self.inner.control.started.load(Ordering::SeqCst)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        let control = &self.inner.control;
        let session = control.session.lock();
        match (session.is_alive(), control.started.load(Ordering::SeqCst)) {
            (true, true) => TaskState::Running,
            (true, false) => TaskState::Paused,
            (false, _) => TaskState::Idle,
        }
    }

    /// Name from the task options.
    pub fn name(&self) -> &str {
        self.inner.options.name()
    }
}

/// Wraps `func` so that it only runs while the task is started.
///
/// An error ends the consumption loop, so it ends session `id` before the tick is
/// acknowledged.
fn gate<T: Send + 'static>(control: Arc<Control>, id: u64, func: TickFn<T>) -> TickFn<T> {
    TickFn::from_fn(move |ctx: TickContext, tick: T| -> BoxTickFuture {
        if !control.started.load(Ordering::SeqCst) {
            return futures::future::ready(Ok::<(), TaskError>(())).boxed();
        }
        let control = Arc::clone(&control);
        let call = func.call(ctx, tick);
        async move {
            let res = call.await;
            if res.is_err() {
                control.end_session(id);
            }
            res
        }
        .boxed()
    })
}

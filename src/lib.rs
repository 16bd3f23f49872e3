//! # tickvisor
//!
//! **Tickvisor** drives async work from ticks: a broadcaster hands every tick to each
//! subscriber and waits until each of them processed it.
//!
//! It provides a manual tick broadcaster, a resettable periodic timer built on it,
//! a start/stop controllable task bound to a tick source, and a set of composable
//! decorators (retry, timeout, logging, mutual exclusion, single flight).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                        ┌──────────────────────────────┐
//!   tick(v) ───────────► │  Ticker<T> / TimeTicker      │ ◄──── reset(period) (timer only)
//!                        │  - consumer registry         │
//!                        │  - in-flight deliveries      │
//!                        └──────┬────────┬────────┬─────┘
//!                   send(v)     ▼        ▼        ▼        (concurrent, one per consumer)
//!                        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!                        │ Consumer │ │ Consumer │ │ Consumer │
//!                        └────┬─────┘ └────┬─────┘ └────┬─────┘
//!                   Ticks<T>  ▼            ▼            ▼
//!                        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!                        │ on_tick  │ │ Task<T>  │ │ Task<T>  │  (consumption loops)
//!                        └────┬─────┘ └────┬─────┘ └────┬─────┘
//!                             ▼            ▼            ▼
//!                     decorated TickFn: with_log(with_retry(with_timeout(f)))
//!                             │
//!                             └─► ack ──► TickHandle::wait() resolves when all acks are in
//! ```
//!
//! ### Delivery
//! ```text
//! Ticker::tick(v)
//!   ├─► prune consumers whose reader finished
//!   └─► for each registered consumer (snapshot):
//!         spawn send(v)
//!           ├─ reader acknowledged   ─► Acknowledged
//!           ├─ consumer closed       ─► Closed   (value dropped, reader sees end)
//!           └─ reader already done   ─► Dropped  (value dropped)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / functions                    |
//! |-------------------|-------------------------------------------------------------|------------------------------------------|
//! | **Ticking**       | Manual and periodic tick broadcasters with acknowledgement. | [`Ticker`], [`TimeTicker`], [`TickHandle`] |
//! | **Consumption**   | Run a tick function over one subscription.                  | [`Ticks`], [`on_tick`]                   |
//! | **Tasks**         | Start/stop controllable consumers with hooks.               | [`Task`], [`TaskOptions`], [`TaskState`] |
//! | **Functions**     | Several closure shapes, normalized once.                    | [`TickFn`], [`IntoTickFn`], [`TickContext`] |
//! | **Decorators**    | Compose retry, timeout, logging and concurrency guards.     | [`decorators`]                           |
//! | **Policies**      | Retry decisions and backoff delays.                         | [`policies`]                             |
//! | **Errors**        | Typed invocation errors, graceful stop included.            | [`TaskError`]                            |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::decorators::{with_log, with_retry};
//! use tickvisor::policies::Attempts;
//! use tickvisor::{Task, TaskOptions, TickContext, TimeTicker};
//! use tokio::time::Instant;
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() {
//!     let timer = TimeTicker::new(Duration::from_secs(1));
//!
//!     let report = |ctx: TickContext, at: Instant| async move {
//!         if ctx.attempt() == 0 {
//!             return Err(format!("first attempt at {at:?} always fails"));
//!         }
//!         Ok(())
//!     };
//!     let task = Task::with_options(
//!         timer.clone(),
//!         with_retry(Attempts::new(2), with_log("report", report)),
//!         TaskOptions::default().with_name("report").with_source_stop(),
//!     );
//!
//!     task.start();
//!     tokio::time::sleep(Duration::from_millis(2500)).await;
//!     task.stop().await;
//!     assert!(!timer.is_running());
//! }
//! ```

mod core;
mod error;
mod tasks;
mod ticker;

pub mod decorators;
pub mod policies;

// ---- Public re-exports ----

pub use self::core::{Task, TaskOptions, TaskState, on_tick};
pub use error::TaskError;
pub use tasks::{BoxTickFuture, IntoTickFn, IntoTickResult, TickContext, TickFn, shape};
pub use ticker::consumer::channel;
pub use ticker::{Consumer, SendOutcome, TickHandle, TickSource, Ticker, Ticks, TimeTicker};

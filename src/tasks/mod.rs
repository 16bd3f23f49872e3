//! # Tick function abstractions.
//!
//! - [`TickContext`] cancellable invocation context with the retry attempt index;
//! - [`TickFn`] canonical, cloneable per-tick function;
//! - [`IntoTickFn`] / [`IntoTickResult`] the accepted user function shapes.

mod context;
mod tick_fn;

pub use context::TickContext;
pub use tick_fn::{BoxTickFuture, IntoTickFn, IntoTickResult, TickFn, shape};

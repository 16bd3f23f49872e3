//! # Function-backed tick handler (`TickFn`)
//!
//! [`TickFn`] is the canonical per-tick function shape:
//! `Fn(TickContext, T) -> Future<Output = Result<(), TaskError>>`.
//! Everything that accepts a tick function (tasks, decorators, the consumption loop)
//! takes `impl IntoTickFn<T, Shape>` and normalizes it once, at construction time.
//!
//! ## Accepted shapes
//! | Shape marker               | Closure                              |
//! |----------------------------|--------------------------------------|
//! | [`shape::Canonical`]       | an existing [`TickFn<T>`]            |
//! | [`shape::Nullary`]         | `Fn() -> Fut`                        |
//! | [`shape::ContextOnly`]     | `Fn(TickContext) -> Fut`             |
//! | [`shape::TickOnly`]        | `Fn(T) -> Fut`                       |
//! | [`shape::Full`]            | `Fn(TickContext, T) -> Fut`          |
//!
//! where `Fut::Output` is either `()` or `Result<(), E>` with `E: Into<TaskError>`
//! (see [`IntoTickResult`]). Any other shape does not implement [`IntoTickFn`] and is
//! rejected by the compiler.
//!
//! ## Example
//! ```rust
//! use tickvisor::{TaskError, TickContext, TickFn};
//!
//! let log_only: TickFn<u64> = TickFn::new(|tick: u64| async move {
//!     println!("tick {tick}");
//! });
//! let fallible: TickFn<u64> = TickFn::new(|ctx: TickContext, tick: u64| async move {
//!     if ctx.is_cancelled() || tick > 10 {
//!         return Err(TaskError::stopped("enough"));
//!     }
//!     Ok(())
//! });
//! # let _ = (log_only, fallible);
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::TaskError;
use crate::tasks::context::TickContext;

/// Boxed future returned by a [`TickFn`] invocation.
pub type BoxTickFuture = BoxFuture<'static, Result<(), TaskError>>;

/// Canonical, cheaply cloneable per-tick function.
pub struct TickFn<T> {
    f: Arc<dyn Fn(TickContext, T) -> BoxTickFuture + Send + Sync>,
}

impl<T> Clone for TickFn<T> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> std::fmt::Debug for TickFn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickFn").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> TickFn<T> {
    /// Normalizes any accepted function shape.
    pub fn new<S>(f: impl IntoTickFn<T, S>) -> Self {
        f.into_tick_fn()
    }

    /// Wraps a function that already has the canonical signature.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(TickContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |ctx: TickContext, tick: T| -> BoxTickFuture {
                f(ctx, tick).boxed()
            }),
        }
    }

    /// Invokes the function for one tick.
    pub fn call(&self, ctx: TickContext, tick: T) -> BoxTickFuture {
        (self.f)(ctx, tick)
    }
}

/// Normalizes the output of a user function into a tick result.
pub trait IntoTickResult {
    /// Converts into the canonical result.
    fn into_tick_result(self) -> Result<(), TaskError>;
}

impl IntoTickResult for () {
    fn into_tick_result(self) -> Result<(), TaskError> {
        Ok(())
    }
}

impl<E: Into<TaskError>> IntoTickResult for Result<(), E> {
    fn into_tick_result(self) -> Result<(), TaskError> {
        self.map_err(Into::into)
    }
}

/// Markers naming the accepted function shapes.
pub mod shape {
    /// An existing [`TickFn`](super::TickFn).
    pub struct Canonical;
    /// `Fn() -> Fut`.
    pub struct Nullary;
    /// `Fn(TickContext) -> Fut`.
    pub struct ContextOnly;
    /// `Fn(T) -> Fut`.
    pub struct TickOnly;
    /// `Fn(TickContext, T) -> Fut`.
    pub struct Full;
}

/// Conversion of an accepted function shape into a [`TickFn`].
///
/// `S` is one of the [`shape`] markers and is always inferred.
pub trait IntoTickFn<T, S> {
    /// Performs the conversion.
    fn into_tick_fn(self) -> TickFn<T>;
}

impl<T> IntoTickFn<T, shape::Canonical> for TickFn<T> {
    fn into_tick_fn(self) -> TickFn<T> {
        self
    }
}

impl<T, F, Fut> IntoTickFn<T, shape::Nullary> for F
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoTickResult,
{
    fn into_tick_fn(self) -> TickFn<T> {
        TickFn::from_fn(move |_ctx: TickContext, _tick: T| {
            let fut = (self)();
            async move { fut.await.into_tick_result() }
        })
    }
}

impl<T, F, Fut> IntoTickFn<T, shape::ContextOnly> for F
where
    T: Send + 'static,
    F: Fn(TickContext) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoTickResult,
{
    fn into_tick_fn(self) -> TickFn<T> {
        TickFn::from_fn(move |ctx: TickContext, _tick: T| {
            let fut = (self)(ctx);
            async move { fut.await.into_tick_result() }
        })
    }
}

impl<T, F, Fut> IntoTickFn<T, shape::TickOnly> for F
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoTickResult,
{
    fn into_tick_fn(self) -> TickFn<T> {
        TickFn::from_fn(move |_ctx: TickContext, tick: T| {
            let fut = (self)(tick);
            async move { fut.await.into_tick_result() }
        })
    }
}

impl<T, F, Fut> IntoTickFn<T, shape::Full> for F
where
    T: Send + 'static,
    F: Fn(TickContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoTickResult,
{
    fn into_tick_fn(self) -> TickFn<T> {
        TickFn::from_fn(move |ctx: TickContext, tick: T| {
            let fut = (self)(ctx, tick);
            async move { fut.await.into_tick_result() }
        })
    }
}

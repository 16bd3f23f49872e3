//! # Tick function decorators.
//!
//! Every decorator takes a tick function (any shape accepted by
//! [`IntoTickFn`](crate::IntoTickFn)) and returns a [`TickFn`](crate::TickFn), so they nest freely.
//! Application order is up to the caller and matters:
//!
//! ```text
//! with_retry(Attempts::new(3), with_log("fetch", fetch))   // logs every attempt
//! with_log("fetch", with_retry(Attempts::new(3), fetch))   // logs once per tick
//! ```
//!
//! | Decorator          | Effect                                                        |
//! |--------------------|---------------------------------------------------------------|
//! | [`sequence`]       | runs functions in order, stops at the first error             |
//! | [`ignore_error`]   | always reports success                                        |
//! | [`with_lock`]      | serializes invocations behind a shared lock                   |
//! | [`no_overlap`]     | skips an invocation while the previous one is still running   |
//! | [`with_timeout`]   | bounds each invocation by a deadline                          |
//! | [`with_log`]       | logs invocations and categorized failures                     |
//! | [`with_retry`]     | re-invokes on failure according to a [`RetryPolicy`](crate::policies::RetryPolicy) |

mod compose;
mod guard;
mod log;
mod retry;
mod timeout;

pub use compose::{ignore_error, sequence};
pub use guard::{no_overlap, with_lock};
pub use log::with_log;
pub use retry::with_retry;
pub use timeout::with_timeout;

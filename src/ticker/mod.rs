//! Tick sources and their consumers.
//!
//! - [`Ticker`] manual broadcaster with per-consumer acknowledgement;
//! - [`TimeTicker`] periodic broadcaster of [`Instant`](tokio::time::Instant)s;
//! - [`Ticks`] the reading side of one subscription;
//! - [`TickHandle`] waits for one dispatched tick;
//! - [`TickSource`] the seam a [`Task`](crate::Task) consumes.

mod broadcaster;
pub mod consumer;
mod handle;
mod source;
mod timer;

pub use broadcaster::Ticker;
pub use consumer::{Consumer, SendOutcome, Ticks};
pub use handle::TickHandle;
pub use source::TickSource;
pub use timer::TimeTicker;

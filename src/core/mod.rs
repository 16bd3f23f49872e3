//! Runtime core: consumption loop and task lifecycle.
//!
//! - [`runner`]: drives one tick subscription through a tick function;
//! - [`task`]: start/stop lifecycle bound to a tick source;
//! - [`options`]: per-task hooks and knobs.

mod options;
mod runner;
mod task;

pub use options::TaskOptions;
pub use runner::on_tick;
pub use task::{Task, TaskState};

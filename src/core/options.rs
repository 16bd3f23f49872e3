//! # Per-task configuration.
//!
//! [`TaskOptions`] carries the optional lifecycle hooks and knobs of a [`Task`](crate::Task).
//!
//! ## Defaults
//! - `name = "task"` (used as the `task` field of lifecycle logs);
//! - no `on_start` / `on_stop` hooks;
//! - `stop_source = false`: [`Task::stop`](crate::Task::stop) leaves the tick source running.
//!
//! ## Example
//! ```rust
//! use tickvisor::{TaskError, TaskOptions};
//!
//! let opts = TaskOptions::default()
//!     .with_name("reporter")
//!     .with_on_start(|| -> Result<(), TaskError> { Ok(()) })
//!     .with_on_stop(|| println!("reporter stopped"))
//!     .with_source_stop();
//!
//! assert_eq!(opts.name(), "reporter");
//! assert!(opts.stops_source());
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::IntoTickResult;

/// Hook invoked by [`Task::start`](crate::Task::start) before delivery resumes.
pub type StartHook = Arc<dyn Fn() -> Result<(), TaskError> + Send + Sync>;

/// Hook invoked by [`Task::stop`](crate::Task::stop).
pub type StopHook = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle options of a task.
#[derive(Clone)]
pub struct TaskOptions {
    pub(crate) name: Cow<'static, str>,
    pub(crate) on_start: Option<StartHook>,
    pub(crate) on_stop: Option<StopHook>,
    pub(crate) stop_source: bool,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("task"),
            on_start: None,
            on_stop: None,
            stop_source: false,
        }
    }
}

impl std::fmt::Debug for TaskOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOptions")
            .field("name", &self.name)
            .field("on_start", &self.on_start.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .field("stop_source", &self.stop_source)
            .finish()
    }
}

impl TaskOptions {
    /// Sets the name reported in lifecycle logs.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the start hook.
    ///
    /// Returning [`TaskError::Stopped`] aborts the start and the task stays stopped.
    /// Any other error is logged and the start proceeds.
    pub fn with_on_start<F, R>(mut self, hook: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoTickResult,
    {
        self.on_start = Some(Arc::new(move || hook().into_tick_result()));
        self
    }

    /// Sets the stop hook.
    pub fn with_on_stop<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_stop = Some(Arc::new(hook));
        self
    }

    /// Makes [`Task::stop`](crate::Task::stop) also stop the tick source.
    ///
    /// This ends the current subscription; the next start opens a fresh one.
    pub fn with_source_stop(mut self) -> Self {
        self.stop_source = true;
        self
    }

    /// Name reported in lifecycle logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if stopping the task stops its tick source.
    pub fn stops_source(&self) -> bool {
        self.stop_source
    }
}

//! Error types produced by tick functions and consumption loops.
//!
//! [`TaskError`] is the single error currency of the crate:
//!
//! - [`TaskError::Stopped`] is the graceful-stop signal. A consumption loop that
//!   sees it ends without treating it as a failure, and retry never repeats it.
//! - [`TaskError::Fail`] is an ordinary (transient) failure, subject to retry.
//! - [`TaskError::Timeout`] is produced by the timeout decorator.
//! - [`TaskError::Canceled`] reports that the invocation context was cancelled.
//!
//! `as_label`/`as_message` give stable strings for structured log fields.

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by tick function invocations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Graceful-stop signal: the consumption loop should end, this is not a failure.
    #[error("stopped: {reason}")]
    Stopped {
        /// Why the function asked to stop.
        reason: String,
    },

    /// Invocation failed but may succeed if retried.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Invocation exceeded its deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The invocation context was cancelled.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Builds the graceful-stop signal with a reason.
    ///
    /// # Example
    /// ```
    /// use tickvisor::TaskError;
    ///
    /// let err = TaskError::stopped("no more work");
    /// assert!(err.is_stopped());
    /// assert_eq!(err.to_string(), "stopped: no more work");
    /// ```
    pub fn stopped(reason: impl Display) -> Self {
        TaskError::Stopped {
            reason: reason.to_string(),
        }
    }

    /// Builds an ordinary failure from anything printable.
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns `true` for the graceful-stop signal.
    pub fn is_stopped(&self) -> bool {
        matches!(self, TaskError::Stopped { .. })
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Stopped { .. } => "task_stopped",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Stopped { reason } => format!("stopped: {reason}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Returns `true` for [`TaskError::Fail`] and [`TaskError::Timeout`],
    /// `false` otherwise.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Fail { .. } | TaskError::Timeout { .. })
    }
}

impl From<&str> for TaskError {
    fn from(error: &str) -> Self {
        TaskError::fail(error)
    }
}

impl From<String> for TaskError {
    fn from(error: String) -> Self {
        TaskError::Fail { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_is_not_retryable() {
        let err = TaskError::stopped("done");
        assert!(err.is_stopped());
        assert!(!err.is_retryable());
        assert_eq!(err.as_label(), "task_stopped");
    }

    #[test]
    fn test_fail_and_timeout_are_retryable() {
        assert!(TaskError::fail("boom").is_retryable());
        assert!(
            TaskError::Timeout {
                timeout: Duration::from_millis(5)
            }
            .is_retryable()
        );
        assert!(!TaskError::Canceled.is_retryable());
    }

    #[test]
    fn test_string_conversions_are_failures() {
        let err: TaskError = "oops".into();
        assert_eq!(err, TaskError::fail("oops"));
        assert_eq!(err.as_message(), "error: oops");

        let err: TaskError = String::from("bad").into();
        assert_eq!(err.to_string(), "execution failed: bad");
    }
}

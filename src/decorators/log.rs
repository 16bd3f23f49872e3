//! # Invocation logging.
//!
//! [`with_log`] emits one event before every invocation and, on failure, one
//! categorized event after it.
//!
//! ## Events
//! ```text
//! INFO  calling   task=fetch                      first attempt
//! INFO  retrying  task=fetch attempt=2            attempt index set by with_retry
//! WARN  stopped   task=fetch attempt=0 reason=..  graceful-stop signal
//! ERROR failed    task=fetch attempt=0 error=..   any other error
//! WARN  cancelled task=fetch                      context cancelled, no error of its own
//! ```

use std::borrow::Cow;

use crate::error::TaskError;
use crate::tasks::{IntoTickFn, TickContext, TickFn};

/// Logs every invocation of `f` under `name` through `tracing`.
pub fn with_log<T, S>(name: impl Into<Cow<'static, str>>, f: impl IntoTickFn<T, S>) -> TickFn<T>
where
    T: Send + 'static,
{
    let name = name.into();
    let f = f.into_tick_fn();
    TickFn::from_fn(move |ctx: TickContext, tick: T| {
        let name = name.clone();
        let f = f.clone();
        async move {
            let attempt = ctx.attempt();
            if attempt == 0 {
                tracing::info!(task = %name, "calling");
            } else {
                tracing::info!(task = %name, attempt, "retrying");
            }

            let res = f.call(ctx.clone(), tick).await;
            match &res {
                Err(err) if err.is_stopped() => {
                    tracing::warn!(task = %name, attempt, reason = %err, "stopped");
                }
                Err(TaskError::Canceled) | Ok(()) => {
                    if ctx.is_cancelled() {
                        tracing::warn!(task = %name, "cancelled");
                    }
                }
                Err(err) => {
                    tracing::error!(task = %name, attempt, error = %err, kind = err.as_label(), "failed");
                }
            }
            res
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::decorators::with_retry;
    use crate::policies::Attempts;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock())
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture() -> (Capture, tracing::subscriber::DefaultGuard) {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    #[tokio::test]
    async fn test_success_logs_calling_only() {
        let (logs, _guard) = capture();
        let f: TickFn<u32> = with_log("fetch", || async {});

        assert_eq!(f.call(TickContext::default(), 1).await, Ok(()));

        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("calling task=fetch"));
    }

    #[tokio::test]
    async fn test_calling_is_logged_before_the_body_runs() {
        let (logs, _guard) = capture();
        let body = logs.clone();
        let f: TickFn<u32> = with_log("ordered", move || {
            body.0.lock().extend_from_slice(b"body\n");
            async {}
        });

        let call = f.call(TickContext::default(), 1);
        assert!(logs.lines().is_empty());

        assert_eq!(call.await, Ok(()));
        let lines = logs.lines();
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].contains("calling task=ordered"));
        assert_eq!(lines[1], "body");
    }

    #[tokio::test]
    async fn test_retries_are_logged_with_attempt() {
        let (logs, _guard) = capture();
        let f: TickFn<u32> = with_retry(
            Attempts::new(3),
            with_log("flaky", || async { Err::<(), _>("boom") }),
        );

        assert_eq!(
            f.call(TickContext::default(), 1).await,
            Err(TaskError::fail("boom"))
        );

        let lines = logs.lines();
        let calls: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("calling") || l.contains("retrying"))
            .collect();
        assert_eq!(calls.len(), 3, "{lines:?}");
        assert!(calls[0].contains("calling task=flaky"));
        assert!(calls[1].contains("retrying task=flaky attempt=1"));
        assert!(calls[2].contains("retrying task=flaky attempt=2"));

        let failures = lines.iter().filter(|l| l.contains("ERROR")).count();
        assert_eq!(failures, 3, "{lines:?}");
    }

    #[tokio::test]
    async fn test_stop_signal_is_not_a_failure() {
        let (logs, _guard) = capture();
        let f: TickFn<u32> = with_log("worker", || async {
            Err::<(), _>(TaskError::stopped("done"))
        });

        assert!(
            f.call(TickContext::default(), 1)
                .await
                .unwrap_err()
                .is_stopped()
        );

        let lines = logs.lines();
        assert!(lines.iter().any(|l| l.contains("WARN") && l.contains("stopped task=worker")));
        assert!(!lines.iter().any(|l| l.contains("ERROR")), "{lines:?}");
    }

    #[tokio::test]
    async fn test_cancelled_context_is_reported() {
        let (logs, _guard) = capture();
        let f: TickFn<u32> = with_log("worker", |ctx: TickContext| async move {
            ctx.token().cancel();
        });

        assert_eq!(f.call(TickContext::default(), 1).await, Ok(()));

        let lines = logs.lines();
        assert!(lines.iter().any(|l| l.contains("WARN") && l.contains("cancelled task=worker")));
    }
}

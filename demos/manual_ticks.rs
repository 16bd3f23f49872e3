//! # Example: manual_ticks
//!
//! Feeds ten manual ticks to a task whose function is wrapped with retry and logging.
//! Tick 2 fails twice and succeeds on the third attempt; tick 3 asks the loop to stop,
//! so ticks 4..9 are released without reaching the function.
//!
//! ## Flow
//! ```text
//! tick 0, 1  ─► calling ─► Ok
//! tick 2     ─► calling ─► failed ─► retrying attempt=1 ─► failed ─► retrying attempt=2 ─► Ok
//! tick 3     ─► calling ─► stopped (not retried) ─► task session stopped
//! tick 4..9  ─► dropped by the finished subscription, wait() still resolves
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example manual_ticks
//! ```

use tickvisor::decorators::{with_log, with_retry};
use tickvisor::policies::Attempts;
use tickvisor::{Task, TaskError, TickContext, Ticker};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let counter = |ctx: TickContext, tick: u32| async move {
        println!("tick # {tick}");
        match tick {
            2 if ctx.attempt() < 2 => Err(TaskError::fail("non-stop error")),
            3 => Err(TaskError::stopped("stop error")),
            _ => Ok(()),
        }
    };

    let ticker = Ticker::<u32>::new();
    let task = Task::new(
        ticker.clone(),
        with_retry(Attempts::new(3), with_log("example", counter)),
    );
    task.start();

    for tick in 0..10 {
        // Waiting keeps the output sequential.
        ticker.tick(tick).wait().await;
    }
    ticker.stop();
}

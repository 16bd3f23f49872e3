//! # Example: periodic_task
//!
//! Binds a task to a one-second timer and stops both after a little over three seconds.
//! Stopping the task also stops the timer, so the process exits with nothing running.
//!
//! ## Output
//! ```text
//! Passed time: 0s
//! Passed time: 1s
//! Passed time: 2s
//! Passed time: 3s
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=tickvisor=debug cargo run --example periodic_task
//! ```

use std::time::Duration;

use tickvisor::{Task, TaskOptions, TimeTicker};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let start = Instant::now();
    let timer = TimeTicker::new(Duration::from_secs(1));
    let task = Task::with_options(
        timer.clone(),
        move |at: Instant| async move {
            println!("Passed time: {}s", (at - start).as_secs_f64().round());
        },
        TaskOptions::default()
            .with_name("clock")
            .with_source_stop()
            .with_on_stop(|| println!("clock stopped")),
    );

    task.start();
    tokio::time::sleep(Duration::from_millis(3010)).await;
    task.stop().await;

    assert!(!timer.is_running());
}

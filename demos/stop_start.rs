//! # Example: stop_start
//!
//! Stopping a task only gates its function: ticks sent while it is stopped are
//! acknowledged and ignored, and the next start resumes the same subscription.
//!
//! Prints ticks 0, 1, 2, 6, 7, 8.
//!
//! ## Run
//! ```bash
//! cargo run --example stop_start
//! ```

use tickvisor::{Task, Ticker};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let ticker = Ticker::<u32>::new();
    let task = Task::new(ticker.clone(), |tick: u32| async move {
        println!("Tick: {tick}");
    });

    let mut next = 0;

    task.start();
    send_ticks(&ticker, &mut next).await;
    task.stop().await;

    // Ignored by the task.
    send_ticks(&ticker, &mut next).await;

    task.start();
    send_ticks(&ticker, &mut next).await;
    task.stop().await;

    println!("state after stop: {:?}", task.state());
}

async fn send_ticks(ticker: &Ticker<u32>, next: &mut u32) {
    for _ in 0..3 {
        ticker.tick(*next).wait().await;
        *next += 1;
    }
}

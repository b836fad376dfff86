//! Pattern 2: Fan-In
//! Merging endless producers and cancelling them
//!
//! Run with: cargo run --example p2_fan_in_cancel

use std::thread;
use std::time::Duration;

use fanin_pipeline::{fan_in, new_canceller, Limit, Producer};

fn fan_in_with_cancel() -> fanin_pipeline::Result<()> {
    let (canceller, observer) = new_canceller(None);

    let inputs = (0..3)
        .map(|id| {
            let mut seq = 0;
            Producer::new().name(format!("sensor-{}", id)).start(
                move || {
                    seq += 1;
                    thread::sleep(Duration::from_millis(20));
                    (id, seq)
                },
                Limit::Unbounded,
                &observer,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let combined = fan_in(inputs, &observer)?;

    // Cancel from another thread after a while.
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        canceller.cancel();
    });

    let mut received = 0;
    while let Some((id, seq)) = combined.recv() {
        println!("sensor-{} reading #{}", id, seq);
        received += 1;
    }
    println!("Combined output closed after {} readings", received);
    Ok(())
}

fn main() -> fanin_pipeline::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("=== Merging Endless Producers and Cancelling Them ===\n");
    fan_in_with_cancel()?;

    println!("\n=== Key Points ===");
    println!("1. One forwarder per input keeps each input's order");
    println!("2. cancel() is seen by every producer and forwarder at its next block");
    println!("3. The combined output still closes exactly once, by its coordinator");
    Ok(())
}

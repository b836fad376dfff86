//! Pattern 3: Timeouts
//! Fixed deadline vs. refreshing idle timeout
//!
//! Run with: cargo run --example p3_fixed_timeout

use std::time::{Duration, Instant};

use fanin_pipeline::{Limit, Pipeline, Received};

fn fixed_deadline() -> fanin_pipeline::Result<()> {
    // The deadline counts from construction, no matter how busy producers are.
    let pipeline = Pipeline::from_toml_str("name = \"fixed\"\ntimeout_ms = 300")?;
    let ticks = pipeline.producer("ticks", || 1u64, Limit::Unbounded)?;
    let combined = pipeline.fan_in(vec![ticks])?;

    let start = Instant::now();
    let total: u64 = combined.iter().sum();
    println!(
        "Received {} ticks before the deadline ({:?}, reason {:?})",
        total,
        start.elapsed(),
        pipeline.observer().reason()
    );
    Ok(())
}

fn refreshing_timeout() -> fanin_pipeline::Result<()> {
    let pipeline = Pipeline::default();
    // Two values, then the producer goes quiet but stays open.
    let mut sent = 0;
    let quiet = pipeline.producer(
        "quiet",
        move || {
            sent += 1;
            if sent > 2 {
                std::thread::sleep(Duration::from_secs(1));
            }
            sent
        },
        Limit::Unbounded,
    )?;

    loop {
        // Each call gets a fresh window.
        match quiet.recv_timeout(Duration::from_millis(200)) {
            Received::Value(n) => println!("Got {}", n),
            Received::Empty => {
                println!("Nothing for 200ms, giving up");
                break;
            }
            Received::Closed => break,
        }
    }
    pipeline.cancel();
    Ok(())
}

fn main() -> fanin_pipeline::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("=== Fixed Deadline ===\n");
    fixed_deadline()?;

    println!("\n=== Refreshing Idle Timeout ===\n");
    refreshing_timeout()?;

    println!("\n=== Key Points ===");
    println!("1. A canceller timeout is a fixed deadline, set once");
    println!("2. recv_timeout restarts its window on every call");
    println!("3. A timeout cancels exactly like cancel() does");
    Ok(())
}

//! Pattern 1: Producers
//! A random-number generator channel
//!
//! Run with: cargo run --example p1_random_numbers

use fanin_pipeline::{start_producer, Limit, Observer};
use rand::Rng;

fn random_numbers() -> fanin_pipeline::Result<()> {
    // The channel comes back at once; the thread fills it behind our back.
    let numbers = start_producer(
        || rand::thread_rng().gen_range(0..1_000),
        Limit::Count(10),
        &Observer::never(),
    )?;

    // Iteration ends when the producer closes its channel.
    for n in &numbers {
        println!("{}", n);
    }

    // A closed channel answers None every time, never a stale 0.
    assert_eq!(numbers.recv(), None);
    println!("Done");
    Ok(())
}

fn main() -> fanin_pipeline::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("=== A Random-Number Generator Channel ===\n");
    random_numbers()?;

    println!("\n=== Key Points ===");
    println!("1. The producer owns its Outlet and is the only one that closes it");
    println!("2. Closure is the completion signal, there is no done flag");
    println!("3. recv() returns Option, so closed is never confused with a value");
    Ok(())
}

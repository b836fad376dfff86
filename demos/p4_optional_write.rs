//! Pattern 4: Non-blocking Sends
//! Send or discard
//!
//! Run with: cargo run --example p4_optional_write

use std::thread;
use std::time::Duration;

use fanin_pipeline::{channel, Delivery};

fn optional_write() {
    let (outlet, output) = channel::<i32>(0);

    // Nobody is receiving yet, so the value is dropped instead of blocking.
    match outlet.send_or_discard(5) {
        Delivery::Discarded => println!("Discarded message"),
        other => println!("Unexpected: {:?}", other),
    }

    let consumer = thread::spawn(move || output.recv());
    thread::sleep(Duration::from_millis(10));

    match outlet.send_or_discard(5) {
        Delivery::Delivered => println!("Sent message"),
        other => println!("Consumer not ready yet: {:?}", other),
    }
    outlet.close();
    println!("Consumer got {:?}", consumer.join().ok().flatten());
}

fn main() {
    println!("=== Send or Discard ===\n");
    optional_write();

    println!("\n=== Key Points ===");
    println!("1. send_or_discard never blocks");
    println!("2. On a rendezvous channel it only delivers to a waiting receiver");
    println!("3. Closed is reported separately from Discarded");
}

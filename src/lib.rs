//! # Fan-In Pipeline
//!
//! Cancellable producer/fan-in pipelines over owned channels.
//!
//! ## Pieces
//!
//! 1. **Owned channels** - [`channel`] returns an [`Outlet`] that only its
//!    owner can write to or close, and an [`Output`] whose reads always say
//!    whether the channel is closed
//! 2. **Producers** - [`start_producer`] runs a generator on its own thread and
//!    closes its channel when done or cancelled
//! 3. **Fan-in** - [`fan_in`] forwards many outputs into one, closing the
//!    combined output exactly once after every forwarder has exited
//! 4. **Cancellation** - [`new_canceller`] gives a one-shot, idempotent signal,
//!    optionally fired by a timeout
//! 5. **Facade** - [`Pipeline`] ties the above to a TOML [`PipelineConfig`]
//!
//! ## Example
//!
//! ```
//! use fanin_pipeline::{fan_in, new_canceller, start_producer, Limit};
//!
//! let (_canceller, observer) = new_canceller(None);
//! let inputs = vec![
//!     start_producer(|| 1, Limit::Count(3), &observer).unwrap(),
//!     start_producer(|| 2, Limit::Count(3), &observer).unwrap(),
//! ];
//! let combined = fan_in(inputs, &observer).unwrap();
//!
//! let total: i32 = combined.iter().sum();
//! assert_eq!(total, 9);
//! assert_eq!(combined.recv(), None);
//! ```
//!
//! ## Running Examples
//!
//! ```bash
//! cargo run --example p1_random_numbers
//! cargo run --example p2_fan_in_cancel
//! cargo run --example p3_fixed_timeout
//! cargo run --example p4_optional_write
//! ```
//!
//! ## Key Dependencies
//!
//! - `crossbeam` - Channels, `select!`, deadline timers and `WaitGroup`
//! - `thiserror` - Derive macro for the error types
//! - `serde` / `toml` - Pipeline configuration
//! - `tracing` - Structured logging from worker threads

pub mod cancel;
pub mod channel;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod producer;
pub mod worker;

pub use cancel::{new_canceller, CancelReason, Canceller, Observer, Outcome};
pub use channel::{channel, Delivery, Outlet, Output, Received};
pub use config::PipelineConfig;
pub use error::{ConfigError, PipelineError, Result};
pub use merge::{fan_in, Merger};
pub use pipeline::Pipeline;
pub use producer::{start_producer, EmitMode, Limit, Producer};

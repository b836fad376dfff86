//! Producers: one thread per sequence, each owning its output channel.

use serde::{Deserialize, Serialize};
use tracing::{debug, Dispatch};

use crate::cancel::{Observer, Outcome};
use crate::channel::{channel, Delivery, Outlet, Output};
use crate::error::Result;
use crate::worker;

/// How many values a producer generates before closing its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(usize),
    Unbounded,
}

impl Limit {
    fn reached(self, generated: usize) -> bool {
        match self {
            Limit::Count(limit) => generated >= limit,
            Limit::Unbounded => false,
        }
    }
}

impl From<usize> for Limit {
    fn from(count: usize) -> Self {
        Limit::Count(count)
    }
}

/// What a producer does when nobody is ready to receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitMode {
    /// Wait for a receiver (or cancellation).
    #[default]
    Blocking,
    /// Drop the value and move on.
    Discard,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    generated: usize,
    delivered: usize,
    discarded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Exhausted,
    Cancelled,
    ConsumerGone,
}

// =============================================================================
// Builder
// =============================================================================

/// Configures and starts a producer thread.
#[derive(Debug, Clone)]
pub struct Producer {
    name: String,
    capacity: usize,
    mode: EmitMode,
    dispatch: Option<Dispatch>,
}

impl Producer {
    pub fn new() -> Self {
        Producer {
            name: "producer".to_string(),
            capacity: 0,
            mode: EmitMode::Blocking,
            dispatch: None,
        }
    }

    /// Thread name, also used as the `producer` field in log events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn mode(mut self, mode: EmitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Where the producer thread logs. Defaults to the dispatch in scope when
    /// [`Producer::start`] is called.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Spawns the producer and returns its output at once.
    ///
    /// The channel closes after `limit` values, on cancellation, or when the
    /// returned [`Output`] is dropped. Closure is the only completion signal.
    pub fn start<T, F>(self, generate: F, limit: Limit, observer: &Observer) -> Result<Output<T>>
    where
        T: Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        let (outlet, output) = channel(self.capacity);
        let dispatch = self.dispatch.unwrap_or_else(worker::current_dispatch);
        let observer = observer.clone();
        let name = self.name;
        let mode = self.mode;

        worker::spawn(name.clone(), dispatch, move || {
            let (stop, tally) = run(generate, limit, mode, outlet, &observer);
            debug!(
                producer = %name,
                stop = ?stop,
                generated = tally.generated,
                delivered = tally.delivered,
                discarded = tally.discarded,
                "producer finished"
            );
        })?;

        Ok(output)
    }
}

impl Default for Producer {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts a producer with default settings: rendezvous channel, blocking emits.
pub fn start_producer<T, F>(generate: F, limit: Limit, observer: &Observer) -> Result<Output<T>>
where
    T: Send + 'static,
    F: FnMut() -> T + Send + 'static,
{
    Producer::new().start(generate, limit, observer)
}

fn run<T, F>(
    mut generate: F,
    limit: Limit,
    mode: EmitMode,
    outlet: Outlet<T>,
    observer: &Observer,
) -> (Stop, Tally)
where
    F: FnMut() -> T,
{
    let mut tally = Tally::default();
    let stop = loop {
        if limit.reached(tally.generated) {
            break Stop::Exhausted;
        }
        if observer.is_cancelled() {
            break Stop::Cancelled;
        }

        let value = generate();
        tally.generated += 1;

        match mode {
            EmitMode::Blocking => match outlet.emit(value, observer) {
                Outcome::Ready(()) => tally.delivered += 1,
                Outcome::Cancelled => break Stop::Cancelled,
                Outcome::Closed => break Stop::ConsumerGone,
            },
            EmitMode::Discard => match outlet.send_or_discard(value) {
                Delivery::Delivered => tally.delivered += 1,
                Delivery::Discarded => tally.discarded += 1,
                Delivery::Closed => break Stop::ConsumerGone,
            },
        }
    };
    outlet.close();
    (stop, tally)
}

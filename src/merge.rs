//! Fan-in: many outputs merged into one.
//!
//! Every input gets its own forwarding thread. A closing coordinator owns the
//! combined [`Outlet`](crate::channel::Outlet) and waits on a wait-group that
//! counts the forwarders still running. Forwarders drop their write handles
//! before leaving the group, so when the count reaches zero the coordinator
//! holds the last one and its close is the one that ends the combined output.

use crossbeam::channel::Sender;
use crossbeam::sync::WaitGroup;
use tracing::{debug, trace, Dispatch};

use crate::cancel::{Observer, Outcome};
use crate::channel::{channel, Output};
use crate::error::Result;
use crate::worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    InputClosed,
    Cancelled,
    ConsumerGone,
}

/// Configures and starts a fan-in.
#[derive(Debug, Clone)]
pub struct Merger {
    name: String,
    capacity: usize,
    dispatch: Option<Dispatch>,
}

impl Merger {
    pub fn new() -> Self {
        Merger {
            name: "merge".to_string(),
            capacity: 0,
            dispatch: None,
        }
    }

    /// Prefix for the forwarder and coordinator thread names.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Capacity of the combined output.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Starts forwarding every input into one combined output.
    ///
    /// Values from the same input keep their order. The combined output
    /// closes once every forwarder has exited, whether its input ran dry or
    /// `observer` was cancelled. Callers can only read from it.
    pub fn start<T, I>(self, inputs: I, observer: &Observer) -> Result<Output<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Output<T>>,
    {
        let (outlet, combined) = channel(self.capacity);
        let dispatch = self.dispatch.unwrap_or_else(worker::current_dispatch);
        let open = WaitGroup::new();
        let mut forwarders = 0usize;

        for (index, input) in inputs.into_iter().enumerate() {
            let tx = outlet.sender();
            let observer = observer.clone();
            let open = open.clone();
            worker::spawn(
                format!("{}-fwd-{}", self.name, index),
                dispatch.clone(),
                move || {
                    let (exit, forwarded) = forward(input, tx, &observer);
                    debug!(input = index, exit = ?exit, forwarded, "forwarder exited");
                    drop(open);
                },
            )?;
            forwarders += 1;
        }

        let name = self.name.clone();
        worker::spawn(format!("{}-close", self.name), dispatch, move || {
            open.wait();
            outlet.close();
            debug!(merger = %name, forwarders, "combined output closed");
        })?;

        Ok(combined)
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges `inputs` into one output with default settings.
pub fn fan_in<T, I>(inputs: I, observer: &Observer) -> Result<Output<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Output<T>>,
{
    Merger::new().start(inputs, observer)
}

/// Moves values from `input` to `tx` until the input closes, the consumer
/// leaves, or cancellation is observed. Consumes both ends.
fn forward<T>(input: Output<T>, tx: Sender<T>, observer: &Observer) -> (Exit, u64) {
    let mut forwarded = 0u64;
    let exit = loop {
        match input.recv_until(observer) {
            Outcome::Ready(value) => match observer.send(&tx, value) {
                Outcome::Ready(()) => {
                    forwarded += 1;
                    trace!(forwarded, "forwarded value");
                }
                Outcome::Cancelled => break Exit::Cancelled,
                Outcome::Closed => break Exit::ConsumerGone,
            },
            Outcome::Closed => break Exit::InputClosed,
            Outcome::Cancelled => break Exit::Cancelled,
        }
    };
    drop(tx);
    drop(input);
    (exit, forwarded)
}

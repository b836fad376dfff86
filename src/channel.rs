//! Single-owner channels.
//!
//! An [`Outlet`] is the only way to write into a channel and cannot be
//! cloned. Closing consumes it, so closing twice or writing after close do
//! not compile. Every read on an [`Output`] tells "closed" apart from a value.

use std::time::Duration;

use crossbeam::channel::{
    bounded, IntoIter, Iter, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError,
};

use crate::cancel::{Observer, Outcome};

/// Creates an owned channel. A `capacity` of zero makes a rendezvous channel:
/// a send completes only when a receiver takes the value.
pub fn channel<T>(capacity: usize) -> (Outlet<T>, Output<T>) {
    let (tx, rx) = bounded(capacity);
    (Outlet { tx }, Output { rx })
}

/// Result of a non-blocking send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No receiver was ready (or the buffer was full); the value was dropped.
    Discarded,
    Closed,
}

/// Result of a non-blocking or time-limited receive.
#[derive(Debug, PartialEq, Eq)]
pub enum Received<T> {
    Value(T),
    /// Still open, but nothing arrived in time.
    Empty,
    Closed,
}

impl<T> Received<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Received::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Received::Closed)
    }
}

// =============================================================================
// Sending side
// =============================================================================

/// The owned writing end of a channel.
pub struct Outlet<T> {
    tx: Sender<T>,
}

impl<T> Outlet<T> {
    /// Blocks until the value is taken. Hands the value back if every
    /// receiver is gone.
    pub fn send(&self, value: T) -> Result<(), T> {
        self.tx.send(value).map_err(|err| err.into_inner())
    }

    /// Blocks until the value is taken or `observer` is cancelled.
    pub fn emit(&self, value: T, observer: &Observer) -> Outcome<()> {
        observer.send(&self.tx, value)
    }

    /// Never blocks.
    pub fn send_or_discard(&self, value: T) -> Delivery {
        match self.tx.try_send(value) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Discarded,
            Err(TrySendError::Disconnected(_)) => Delivery::Closed,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }

    /// Closes the channel. Receivers drain what is buffered, then see
    /// "closed".
    pub fn close(self) {
        drop(self);
    }

    /// Write handle for the merger's forwarders; never leaves the crate.
    pub(crate) fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }
}

impl<T> std::fmt::Debug for Outlet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outlet")
            .field("len", &self.tx.len())
            .field("capacity", &self.tx.capacity())
            .finish()
    }
}

// =============================================================================
// Receiving side
// =============================================================================

/// The reading end of a channel.
pub struct Output<T> {
    rx: Receiver<T>,
}

impl<T> Output<T> {
    /// Blocks for the next value. `None` means closed and drained.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Received<T> {
        match self.rx.try_recv() {
            Ok(value) => Received::Value(value),
            Err(TryRecvError::Empty) => Received::Empty,
            Err(TryRecvError::Disconnected) => Received::Closed,
        }
    }

    /// Waits at most `timeout` for this one value. The window restarts on
    /// every call.
    pub fn recv_timeout(&self, timeout: Duration) -> Received<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Received::Value(value),
            Err(RecvTimeoutError::Timeout) => Received::Empty,
            Err(RecvTimeoutError::Disconnected) => Received::Closed,
        }
    }

    /// Blocks for the next value unless `observer` is cancelled first.
    pub fn recv_until(&self, observer: &Observer) -> Outcome<T> {
        observer.recv(&self.rx)
    }

    /// Iterates until the channel is closed.
    pub fn iter(&self) -> Iter<'_, T> {
        self.rx.iter()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.rx.capacity()
    }
}

impl<T> IntoIterator for Output<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Output<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.iter()
    }
}

impl<T> std::fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("len", &self.rx.len())
            .field("capacity", &self.rx.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::new_canceller;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_closed_channel_reports_closed_not_default() {
        let (outlet, output) = channel::<i32>(0);
        outlet.close();

        // A closed channel must not spin on a zero value.
        for _ in 0..3 {
            assert_eq!(output.recv(), None);
            assert_eq!(output.try_recv(), Received::Closed);
        }
    }

    #[test]
    fn test_buffered_values_drain_before_closed() {
        let (outlet, output) = channel(2);
        outlet.send(1).unwrap();
        outlet.send(2).unwrap();
        outlet.close();

        assert_eq!(output.recv(), Some(1));
        assert_eq!(output.recv(), Some(2));
        assert_eq!(output.recv(), None);
    }

    #[test]
    fn test_send_after_receiver_dropped_returns_value() {
        let (outlet, output) = channel(0);
        drop(output);
        assert_eq!(outlet.send(5), Err(5));
        assert_eq!(outlet.send_or_discard(5), Delivery::Closed);
    }

    #[test]
    fn test_send_or_discard_without_receiver() {
        let (outlet, output) = channel(0);
        assert_eq!(outlet.send_or_discard(5), Delivery::Discarded);
        assert_eq!(output.try_recv(), Received::Empty);
    }

    #[test]
    fn test_send_or_discard_full_buffer() {
        let (outlet, output) = channel(1);
        assert_eq!(outlet.send_or_discard(1), Delivery::Delivered);
        assert_eq!(outlet.send_or_discard(2), Delivery::Discarded);
        assert_eq!(output.recv(), Some(1));
    }

    #[test]
    fn test_recv_timeout_refreshes_per_call() {
        let (outlet, output) = channel(0);
        let producer = thread::spawn(move || {
            outlet.send(1).unwrap();
            thread::sleep(Duration::from_millis(30));
            outlet.send(2).unwrap();
            // Hold the channel open past the next timeout window.
            thread::sleep(Duration::from_millis(200));
        });

        assert_eq!(output.recv_timeout(Duration::from_secs(2)), Received::Value(1));
        assert_eq!(output.recv_timeout(Duration::from_secs(2)), Received::Value(2));
        assert_eq!(output.recv_timeout(Duration::from_millis(20)), Received::Empty);

        producer.join().unwrap();
        assert_eq!(output.recv_timeout(Duration::from_millis(20)), Received::Closed);
    }

    #[test]
    fn test_recv_until_cancelled() {
        let (canceller, observer) = new_canceller(None);
        let (_outlet, output) = channel::<u8>(0);

        let waiter = thread::spawn(move || output.recv_until(&observer));
        thread::sleep(Duration::from_millis(20));
        canceller.cancel();

        assert_eq!(waiter.join().unwrap(), Outcome::Cancelled);
    }

    #[test]
    fn test_emit_unblocks_on_timeout() {
        let (_canceller, observer) = new_canceller(Some(Duration::from_millis(20)));
        let (outlet, _output) = channel(0);

        let start = Instant::now();
        assert_eq!(outlet.emit(1, &observer), Outcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_iterates_until_closed() {
        let (outlet, output) = channel(0);
        thread::spawn(move || {
            for i in 0..5 {
                outlet.send(i).unwrap();
            }
        });

        let values: Vec<i32> = output.into_iter().collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_capacity_reported() {
        let (outlet, output) = channel::<u8>(4);
        assert_eq!(outlet.capacity(), Some(4));
        assert_eq!(output.capacity(), Some(4));
        assert!(output.is_empty());
        assert_eq!(output.len(), 0);
    }
}

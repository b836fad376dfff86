//! One-shot, broadcast cancellation with an optional deadline.
//!
//! A [`Canceller`] moves from active to cancelled exactly once. Every
//! [`Observer`] sees the transition at its next blocking point: the broadcast
//! is a channel whose only sender is dropped on cancel, so a `recv` on it
//! becomes ready for every observer at once.
//!
//! A deadline is not driven by a timer thread. Observers race their blocking
//! operation against `crossbeam::channel::at(deadline)`, and the first one to
//! see the deadline latches the state with [`CancelReason::Timeout`].

use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, select, Receiver, Sender};
use tracing::debug;

/// Why an observer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Manual,
    Timeout,
}

/// Result of a blocking operation raced against cancellation.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Ready(T),
    /// The other end of the channel is gone.
    Closed,
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }
}

struct Shared {
    reason: OnceLock<CancelReason>,
    trigger: Mutex<Option<Sender<()>>>,
    deadline: Option<Instant>,
}

impl Shared {
    fn new(deadline: Option<Instant>) -> (Arc<Self>, Receiver<()>) {
        let (trigger, signal) = channel::bounded(0);
        let shared = Arc::new(Shared {
            reason: OnceLock::new(),
            trigger: Mutex::new(Some(trigger)),
            deadline,
        });
        (shared, signal)
    }

    fn fire(&self, reason: CancelReason) {
        if self.reason.set(reason).is_err() {
            return;
        }
        let trigger = self
            .trigger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(trigger);
        debug!(reason = ?reason, "cancellation triggered");
    }

    fn check(&self) -> bool {
        if self.reason.get().is_some() {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.fire(CancelReason::Timeout);
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Canceller
// =============================================================================

/// The triggering side. Cloning it shares the same signal.
#[derive(Clone)]
pub struct Canceller {
    shared: Arc<Shared>,
    signal: Receiver<()>,
}

impl Canceller {
    /// A canceller that only fires on [`Canceller::cancel`].
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A canceller that also fires once `timeout` has elapsed from now.
    ///
    /// A zero timeout cancels immediately. A timeout too large to represent
    /// as an `Instant` never fires.
    pub fn with_timeout(timeout: Duration) -> Self {
        let canceller = Self::build(Instant::now().checked_add(timeout));
        if timeout.is_zero() {
            canceller.shared.fire(CancelReason::Timeout);
        }
        canceller
    }

    fn build(deadline: Option<Instant>) -> Self {
        let (shared, signal) = Shared::new(deadline);
        Canceller { shared, signal }
    }

    /// Idempotent; only the first call (or an earlier timeout) has an effect.
    pub fn cancel(&self) {
        self.shared.fire(CancelReason::Manual);
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.check()
    }

    pub fn observe(&self) -> Observer {
        Observer {
            shared: Arc::clone(&self.shared),
            signal: self.signal.clone(),
        }
    }
}

impl Default for Canceller {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a canceller and a first observer of it.
pub fn new_canceller(timeout: Option<Duration>) -> (Canceller, Observer) {
    let canceller = match timeout {
        Some(timeout) => Canceller::with_timeout(timeout),
        None => Canceller::new(),
    };
    let observer = canceller.observe();
    (canceller, observer)
}

// =============================================================================
// Observer
// =============================================================================

/// Read-only view of a cancellation signal.
#[derive(Clone)]
pub struct Observer {
    shared: Arc<Shared>,
    signal: Receiver<()>,
}

impl Observer {
    /// An observer whose signal never fires.
    pub fn never() -> Self {
        Canceller::new().observe()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.check()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        self.shared.check();
        self.shared.reason.get().copied()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.shared.deadline
    }

    fn timer(&self) -> Receiver<Instant> {
        match self.shared.deadline {
            Some(deadline) => channel::at(deadline),
            None => channel::never(),
        }
    }

    fn expire(&self) {
        self.shared.fire(CancelReason::Timeout);
    }

    /// Blocks until cancelled.
    pub fn wait(&self) {
        if self.is_cancelled() {
            return;
        }
        select! {
            recv(self.signal) -> _ => {}
            recv(self.timer()) -> _ => self.expire(),
        }
    }

    /// Blocks for at most `timeout`; returns whether the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        select! {
            recv(self.signal) -> _ => true,
            recv(self.timer()) -> _ => {
                self.expire();
                true
            }
            recv(channel::after(timeout)) -> _ => self.is_cancelled(),
        }
    }

    /// Receives from `rx` unless cancellation is observed first.
    ///
    /// Once this observer has seen the signal, no further value is taken.
    pub fn recv<T>(&self, rx: &Receiver<T>) -> Outcome<T> {
        if self.is_cancelled() {
            return Outcome::Cancelled;
        }
        select! {
            recv(rx) -> msg => match msg {
                Ok(value) => Outcome::Ready(value),
                Err(_) => Outcome::Closed,
            },
            recv(self.signal) -> _ => Outcome::Cancelled,
            recv(self.timer()) -> _ => {
                self.expire();
                Outcome::Cancelled
            }
        }
    }

    /// Sends `value` on `tx` unless cancellation is observed first.
    ///
    /// On `Cancelled` or `Closed` the value is dropped.
    pub fn send<T>(&self, tx: &Sender<T>, value: T) -> Outcome<()> {
        if self.is_cancelled() {
            return Outcome::Cancelled;
        }
        select! {
            send(tx, value) -> res => match res {
                Ok(()) => Outcome::Ready(()),
                Err(_) => Outcome::Closed,
            },
            recv(self.signal) -> _ => Outcome::Cancelled,
            recv(self.timer()) -> _ => {
                self.expire();
                Outcome::Cancelled
            }
        }
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("reason", &self.shared.reason.get())
            .field("deadline", &self.shared.deadline)
            .finish()
    }
}

impl std::fmt::Debug for Canceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canceller")
            .field("reason", &self.shared.reason.get())
            .field("deadline", &self.shared.deadline)
            .finish()
    }
}

//! State change notification.
//!
//! # Responsibilities
//! - Hand out one sink per subscriber
//! - Publish every transition to all live sinks
//!
//! # Design Decisions
//! - Each sink holds at most one pending state; a newer transition replaces
//!   an unread older one, so a slow subscriber only sees the latest state
//! - Publishing never waits on a subscriber
//! - Transitions are published outside the breaker's lock, tagged with the
//!   breaker epoch; a publish older than the slot's current value is dropped,
//!   so sinks never see state go backwards
//! - Built on `tokio::sync::watch`, which has exactly these semantics
//! - Delivery is best-effort: intermediate transitions may be skipped

use tokio::sync::watch;

use crate::resilience::state::State;

/// A state change waiting to be published.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    /// Breaker epoch after the change; strictly increasing.
    pub(crate) epoch: u64,
    pub(crate) state: State,
}

/// Publisher side, owned by the breaker.
#[derive(Debug)]
pub(crate) struct Notifier {
    tx: watch::Sender<Transition>,
}

impl Notifier {
    pub(crate) fn new(initial: State) -> Self {
        let (tx, _) = watch::channel(Transition {
            epoch: 0,
            state: initial,
        });
        Self { tx }
    }

    /// Register a new sink. The current state counts as already seen.
    pub(crate) fn subscribe(&self) -> StateSink {
        StateSink {
            rx: self.tx.subscribe(),
        }
    }

    /// Overwrite every sink's slot with `transition`, unless a later one is
    /// already there.
    pub(crate) fn publish(&self, transition: Transition) {
        // Stores the value even when no sink is listening.
        self.tx.send_if_modified(|current| {
            if transition.epoch > current.epoch {
                *current = transition;
                true
            } else {
                false
            }
        });
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A single-slot, read-only stream of breaker state changes.
///
/// Dropping the sink unsubscribes it.
#[derive(Debug)]
pub struct StateSink {
    rx: watch::Receiver<Transition>,
}

impl StateSink {
    /// Take the pending state, if a transition happened since the last read.
    ///
    /// Returns `None` when nothing is pending or the breaker has been dropped.
    pub fn try_recv(&mut self) -> Option<State> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().state),
            _ => None,
        }
    }

    /// Wait for the next pending state.
    ///
    /// Returns `None` once the breaker has been dropped and nothing is pending.
    pub async fn recv(&mut self) -> Option<State> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().state),
            Err(_) => None,
        }
    }

    /// The most recently published state, without consuming it.
    pub fn latest(&self) -> State {
        self.rx.borrow().state
    }
}

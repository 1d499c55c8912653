//! The pool's event stream: subscribers observe admissions, replacements,
//! evictions, and mined reconciliation without reaching into pool internals.

use alloy_primitives::B256;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// An observable pool state change.
#[derive(Debug, Clone)]
pub enum PoolEvent {
    /// A transaction was newly admitted.
    Added(B256),
    /// A transaction replaced an incumbent at the same `(sender, nonce)`.
    Replaced {
        /// The hash that was displaced.
        old: B256,
        /// The hash that replaced it.
        new: B256,
    },
    /// A transaction was dropped: it expired, was evicted to make room, or
    /// its sender/pool admission was rejected.
    Discarded(B256),
    /// A transaction was removed because it was mined.
    Mined(B256),
}

/// Fan-out channel for [`PoolEvent`]s. Cloneable; a dropped receiver simply
/// stops observing, it never affects delivery to the others.
#[derive(Debug, Clone)]
pub struct PoolEventBroadcast {
    sender: broadcast::Sender<PoolEvent>,
}

impl PoolEventBroadcast {
    /// Creates a broadcast channel buffering up to `capacity` unconsumed
    /// events per subscriber before it starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }

    /// Subscribes to future events as a [`Stream`](tokio_stream::Stream), for
    /// callers that prefer combinators over polling a raw `Receiver`.
    pub fn subscribe_stream(&self) -> BroadcastStream<PoolEvent> {
        BroadcastStream::new(self.subscribe())
    }

    /// Publishes `event`. No-ops if there are no subscribers.
    pub fn publish(&self, event: PoolEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for PoolEventBroadcast {
    fn default() -> Self {
        Self::new(1024)
    }
}

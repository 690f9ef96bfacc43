//! The publish/subscribe seam.
//!
//! The core never talks to a transport. It hands committed events to an
//! [`EventPublisher`]; delivery guarantees are the embedder's problem.
//! Publishing is infallible from the core's point of view — an
//! implementation that cannot deliver logs and drops.

use std::sync::Mutex;

use bidhall_types::{constants, AuctionEvent, Topic};
use tokio::sync::broadcast;

/// Receives settlement outcome events after commit.
pub trait EventPublisher {
    /// Deliver one event to one topic. Best-effort: implementations
    /// must not panic and must not block the settlement path.
    fn publish(&self, topic: Topic, event: &AuctionEvent);
}

/// Discards everything. For embedders that poll state instead.
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _topic: Topic, _event: &AuctionEvent) {}
}

/// Reference implementation over a tokio broadcast channel. Subscribers
/// filter on the topic themselves; a lagging subscriber loses events
/// rather than backpressuring settlement.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<(Topic, AuctionEvent)>,
}

impl BroadcastPublisher {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(constants::EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// A new subscription to the event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<(Topic, AuctionEvent)> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, topic: Topic, event: &AuctionEvent) {
        // Err means no live receivers; the commit stands either way.
        if self.tx.send((topic, event.clone())).is_err() {
            tracing::debug!(topic = %topic, kind = event.kind(), "No subscribers for event");
        }
    }
}

/// Captures every published event for assertions.
pub struct RecordingPublisher {
    events: Mutex<Vec<(Topic, AuctionEvent)>>,
}

impl RecordingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Everything published so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<(Topic, AuctionEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events delivered to one topic, in order.
    #[must_use]
    pub fn for_topic(&self, topic: Topic) -> Vec<AuctionEvent> {
        self.events()
            .into_iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, e)| e)
            .collect()
    }
}

impl Default for RecordingPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, topic: Topic, event: &AuctionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push((topic, event.clone()));
        }
    }
}

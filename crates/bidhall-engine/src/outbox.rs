//! The event outbox.
//!
//! Events are staged while a settlement transaction is in flight and
//! drained to the publisher only after it commits. An aborted
//! settlement drops its outbox with everything still inside, so
//! subscribers never see an event for state that didn't happen.

use bidhall_types::{AuctionEvent, Topic};

use crate::publisher::EventPublisher;

/// Events staged during one settlement, published after its commit.
#[derive(Default)]
pub struct Outbox {
    staged: Vec<(Topic, AuctionEvent)>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self { staged: Vec::new() }
    }

    /// Stage an event for post-commit delivery.
    pub fn stage(&mut self, topic: Topic, event: AuctionEvent) {
        self.staged.push((topic, event));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Drain every staged event to the publisher, in staging order.
    /// Called strictly after commit; delivery problems are the
    /// publisher's to swallow.
    pub fn publish_all<P: EventPublisher>(self, publisher: &P) {
        for (topic, event) in self.staged {
            tracing::debug!(topic = %topic, kind = event.kind(), "Publishing event");
            publisher.publish(topic, &event);
        }
    }
}

//! Typed change notifications.
//!
//! Services publish [`SessionEvent`]s after their state changed; views
//! subscribe and re-read snapshots. Publishing with no subscriber is not an
//! error.

use photofeed_core::SessionEvent;
use tokio::sync::broadcast;

/// Default number of events a slow subscriber may lag behind.
const DEFAULT_CAPACITY: usize = 64;

/// Broadcast channel shared by all services of a session.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish `event` to current subscribers.
    pub fn publish(&self, event: SessionEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!("Published {} to {} subscriber(s)", name, receivers),
            Err(_) => tracing::debug!("Published {} with no subscribers", name),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

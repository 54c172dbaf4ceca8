//! # Event Publisher
//!
//! Defines the publishing side of the event bus: an append-only log plus a
//! broadcast channel for live subscribers.

use crate::events::{EventFilter, FeeEvent, RecordedEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use shared_types::ChainId;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Trait for publishing committed events.
pub trait EventPublisher: Send + Sync {
    /// Append a committed batch emitted by `chain_id`'s ledger.
    ///
    /// Returns the sequence number assigned to the first event, or `None`
    /// for an empty batch.
    fn publish(&self, chain_id: ChainId, events: Vec<FeeEvent>) -> Option<u64>;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Keeps the full history for indexers and tests, and fans every event out
/// over `tokio::sync::broadcast` to live subscribers.
pub struct InMemoryEventBus {
    /// Append-only history.
    log: RwLock<Vec<RecordedEvent>>,

    /// Broadcast sender for events.
    sender: broadcast::Sender<RecordedEvent>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            log: RwLock::new(Vec::new()),
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, chains = ?filter.chains, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Subscribe and return the matching history recorded so far.
    ///
    /// Publishing holds the log's write lock while broadcasting, so nothing
    /// falls between the returned history and the first live event.
    #[must_use]
    pub fn subscribe_with_history(&self, filter: EventFilter) -> (Vec<RecordedEvent>, Subscription) {
        let log = self.log.read();
        let backlog = log
            .iter()
            .filter(|recorded| filter.matches(recorded))
            .cloned()
            .collect();
        let subscription = Subscription::new(self.sender.subscribe(), filter);
        drop(log);
        (backlog, subscription)
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }

    /// Full history in sequence order.
    #[must_use]
    pub fn history(&self) -> Vec<RecordedEvent> {
        self.log.read().clone()
    }

    /// History restricted to a filter.
    #[must_use]
    pub fn history_matching(&self, filter: &EventFilter) -> Vec<RecordedEvent> {
        self.log
            .read()
            .iter()
            .filter(|recorded| filter.matches(recorded))
            .cloned()
            .collect()
    }

    /// Bare events emitted by one chain, in order.
    #[must_use]
    pub fn events_for_chain(&self, chain_id: ChainId) -> Vec<FeeEvent> {
        self.log
            .read()
            .iter()
            .filter(|recorded| recorded.chain_id == chain_id)
            .map(|recorded| recorded.event.clone())
            .collect()
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, chain_id: ChainId, events: Vec<FeeEvent>) -> Option<u64> {
        if events.is_empty() {
            return None;
        }

        let mut log = self.log.write();
        let first = log.len() as u64;
        for event in events {
            let recorded = RecordedEvent {
                sequence: log.len() as u64,
                chain_id,
                event,
            };
            trace!(chain_id, sequence = recorded.sequence, topic = ?recorded.event.topic(), "Event recorded");
            // No receivers is fine: the log is the source of truth.
            let _ = self.sender.send(recorded.clone());
            log.push(recorded);
            self.events_published.fetch_add(1, Ordering::Relaxed);
        }
        Some(first)
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

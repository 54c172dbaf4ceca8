//! # Shared Bus - Domain Event Log
//!
//! Append-only record of every successful mutation on every chain, consumable
//! by tests and by external indexers.
//!
//! ```text
//! ┌──────────────┐  emit()   ┌─────────────┐  commit   ┌────────────────┐
//! │  Component   │ ────────→ │ EventBuffer │ ────────→ │ InMemoryEventBus│──→ subscribers
//! └──────────────┘           └─────────────┘           └────────────────┘
//!                                   │ revert
//!                                   ↓
//!                                dropped
//! ```
//!
//! Events are staged per ledger transaction and only reach the bus when the
//! transaction commits.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod buffer;
pub mod events;
pub mod publisher;
pub mod subscriber;

pub use buffer::EventBuffer;
pub use events::{EventFilter, EventTopic, ExecutionStatus, FeeEvent, RecordedEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
        assert_eq!(InMemoryEventBus::new().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}

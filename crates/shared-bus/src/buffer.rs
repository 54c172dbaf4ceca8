//! # Event Buffer
//!
//! Transaction-scoped staging area. Components emit into a buffer; the
//! coordinator publishes it only when the ledger transaction commits, so a
//! reverted call leaves no trace on the bus.

use crate::events::FeeEvent;

/// Events emitted by one ledger transaction, in emission order.
#[derive(Debug, Default, Clone)]
pub struct EventBuffer {
    events: Vec<FeeEvent>,
}

impl EventBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one event.
    pub fn emit(&mut self, event: FeeEvent) {
        self.events.push(event);
    }

    /// Append everything staged in `other` (nested call committed).
    pub fn absorb(&mut self, other: EventBuffer) {
        self.events.extend(other.events);
    }

    /// Staged events.
    #[must_use]
    pub fn events(&self) -> &[FeeEvent] {
        &self.events
    }

    /// Number of staged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing was staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take the staged events out.
    #[must_use]
    pub fn into_events(self) -> Vec<FeeEvent> {
        self.events
    }
}

//! # Event Subscriber
//!
//! Receiving side of the bus. A `Subscription` pulls filtered events from
//! the broadcast feed; `EventStream` exposes the same feed as a
//! `tokio_stream::Stream`.
//!
//! A subscriber that falls more than the channel capacity behind skips the
//! overwritten events. The bus history still has them.

use crate::events::{EventFilter, RecordedEvent};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was dropped.
    #[error("event bus closed")]
    Closed,
}

/// Filtered handle on the live event feed.
pub struct Subscription {
    receiver: broadcast::Receiver<RecordedEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<RecordedEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Wait for the next matching event. `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<RecordedEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(recorded) if self.filter.matches(&recorded) => return Some(recorded),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Option<RecordedEvent>, SubscriptionError> {
        use broadcast::error::TryRecvError;
        loop {
            match self.receiver.try_recv() {
                Ok(recorded) if self.filter.matches(&recorded) => return Ok(Some(recorded)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => debug!(skipped, "Subscriber lagged"),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Every matching event buffered right now, oldest first.
    pub fn drain(&mut self) -> Vec<RecordedEvent> {
        let mut drained = Vec::new();
        while let Ok(Some(recorded)) = self.try_recv() {
            drained.push(recorded);
        }
        drained
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Convert into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream {
            inner: BroadcastStream::new(self.receiver),
            filter: self.filter,
        }
    }
}

/// `Stream` over the filtered feed; ends when the bus is dropped.
pub struct EventStream {
    inner: BroadcastStream<RecordedEvent>,
    filter: EventFilter,
}

impl EventStream {
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = RecordedEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(recorded)) if this.filter.matches(&recorded) => {
                    return Poll::Ready(Some(recorded))
                }
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    debug!(skipped, "Event stream lagged");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

//! Change feed
//!
//! Subscribers receive [`StoreEvent`]s over unbounded channels. The store
//! publishes while still holding its write lock, after the record has been
//! updated, so every subscriber sees events in the order mutations applied.

use crate::types::{Document, Status};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Something that happened to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum StoreEvent {
    /// New document accepted
    Submitted { document: Document },
    /// Status changed through the workflow
    StatusChanged {
        previous: Status,
        current: Status,
        /// Who made this change; may differ from `document.reviewer`
        actor: Option<String>,
        document: Document,
    },
}

impl StoreEvent {
    /// Document as it stands after the event
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        match self {
            StoreEvent::Submitted { document } | StoreEvent::StatusChanged { document, .. } => {
                document
            }
        }
    }

    /// `(previous, current)` for status changes
    #[inline]
    #[must_use]
    pub fn status_change(&self) -> Option<(Status, Status)> {
        match self {
            StoreEvent::StatusChanged {
                previous, current, ..
            } => Some((*previous, *current)),
            StoreEvent::Submitted { .. } => None,
        }
    }
}

/// Fan-out of store events to live subscribers
#[derive(Debug, Default)]
pub(crate) struct ChangeFeed {
    senders: Mutex<Vec<UnboundedSender<StoreEvent>>>,
}

impl ChangeFeed {
    pub(crate) fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        Subscription { rx }
    }

    /// Deliver to every subscriber; dropped subscriptions are pruned.
    pub(crate) fn publish(&self, event: &StoreEvent) {
        let mut senders = self.senders.lock();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.senders.lock().len()
    }
}

/// Receiving end of the change feed
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<StoreEvent>,
}

impl Subscription {
    /// Next event if one is queued, without waiting
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued
    pub fn drain(&mut self) -> Vec<StoreEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next event; `None` once the store is dropped
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        self.rx.recv().await
    }
}

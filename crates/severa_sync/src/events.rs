//! Cycle status signaling.
//!
//! Consumers observe sync progress through an explicit subscription
//! channel rather than ambient events: subscribe, hold the receiver, and
//! drain it wherever status is rendered.

use crate::orchestrator::{SyncReport, SyncStatus};
use parking_lot::Mutex;
use std::sync::mpsc::{channel, Receiver, Sender};

/// An observable moment in the sync lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The engine moved between idle and syncing.
    StatusChanged(SyncStatus),
    /// A cycle finished; both phases ran to completion.
    Completed(SyncReport),
    /// A cycle aborted. The store is consistent but stale.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

/// Fan-out of [`SyncEvent`]s to any number of subscribers.
///
/// Subscribers that drop their receiver are pruned on the next emit, so a
/// departed observer never blocks or leaks.
#[derive(Debug, Default)]
pub struct StatusFeed {
    subscribers: Mutex<Vec<Sender<SyncEvent>>>,
}

impl StatusFeed {
    /// Creates an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its receiving end.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        let (tx, rx) = channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub(crate) fn emit(&self, event: SyncEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

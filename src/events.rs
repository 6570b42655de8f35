//! Typed change notifications for observers of the workflow store.
//!
//! The rendering layer subscribes instead of polling the store. Events are
//! sent after the store mutation they describe has been applied.

use crate::model::EntryKey;
use crate::transaction::{Operation, TransactionId};
use tokio::sync::broadcast;

/// Capacity of the event channel; slow subscribers observe `Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq)]
pub enum WorkflowEvent {
    TransactionBegun {
        id: TransactionId,
        key: EntryKey,
        operation: Operation,
    },
    TransactionCommitted {
        id: TransactionId,
        key: EntryKey,
        operation: Operation,
    },
    TransactionReverted {
        id: TransactionId,
        key: EntryKey,
        operation: Operation,
    },
    UnpublishedEntriesLoading,
    UnpublishedEntriesLoaded {
        count: usize,
        pages: u32,
    },
    UnpublishedEntriesFailed {
        message: String,
    },
    UnpublishedEntryLoaded {
        key: EntryKey,
    },
    /// The entry already left the workflow; it is read as published instead.
    UnpublishedEntryRedirected {
        key: EntryKey,
    },
    EntryLoaded {
        key: EntryKey,
    },
}

/// Sending half shared by the workflow and its transaction manager.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes an event. Having no subscriber is not an error.
    pub fn emit(&self, event: WorkflowEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

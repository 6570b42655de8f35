//! Three-phase optimistic protocol: begin, then commit or revert.

use super::error::TransactionError;
use super::id::TransactionId;
use super::update::{Operation, OptimisticUpdate, Resolution};
use crate::events::{EventBus, WorkflowEvent};
use crate::model::EntryKey;
use crate::store::SharedStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens transactions against the shared store.
#[derive(Clone, Debug)]
pub struct TransactionManager {
    store: SharedStore,
    events: EventBus,
}

impl TransactionManager {
    pub fn new(store: SharedStore, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Applies `update` to the store and returns the handle that settles it.
    ///
    /// The mutation is visible to every reader as soon as this returns,
    /// before the caller issues its backend call.
    pub fn begin(&self, update: OptimisticUpdate) -> Result<Transaction, TransactionError> {
        let id = TransactionId::new();
        let key = update.key();
        let operation = update.operation();

        self.store.lock().begin(id, update)?;
        debug!(transaction = %id, entry = %key, %operation, "transaction begun");
        self.events.emit(WorkflowEvent::TransactionBegun {
            id,
            key: key.clone(),
            operation,
        });

        Ok(Transaction {
            id,
            key,
            operation,
            store: Arc::clone(&self.store),
            events: self.events.clone(),
            settled: false,
        })
    }
}

/// An open transaction.
///
/// Consumed by exactly one of [`Transaction::commit`] or
/// [`Transaction::revert`]. A handle dropped while still open reverts itself.
#[must_use = "an open transaction reverts when dropped"]
#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    key: EntryKey,
    operation: Operation,
    store: SharedStore,
    events: EventBus,
    settled: bool,
}

impl Transaction {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn key(&self) -> &EntryKey {
        &self.key
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Adopts the backend result and forgets the snapshot.
    ///
    /// Returns the key the entry lives under afterwards, which differs from
    /// [`Transaction::key`] when the backend assigned a new slug.
    pub fn commit(mut self, resolution: Resolution) -> Result<EntryKey, TransactionError> {
        self.settled = true;
        let key = self.store.lock().commit(self.id, resolution)?;
        debug!(
            transaction = %self.id,
            entry = %key,
            operation = %self.operation,
            "transaction committed"
        );
        self.events.emit(WorkflowEvent::TransactionCommitted {
            id: self.id,
            key: key.clone(),
            operation: self.operation,
        });
        Ok(key)
    }

    /// Restores the entry to its state before `begin`.
    pub fn revert(mut self) -> Result<(), TransactionError> {
        self.settled = true;
        self.rollback()
    }

    fn rollback(&self) -> Result<(), TransactionError> {
        let key = self.store.lock().revert(self.id)?;
        debug!(
            transaction = %self.id,
            entry = %key,
            operation = %self.operation,
            "transaction reverted"
        );
        self.events.emit(WorkflowEvent::TransactionReverted {
            id: self.id,
            key,
            operation: self.operation,
        });
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(
            transaction = %self.id,
            entry = %self.key,
            "transaction dropped while open, reverting"
        );
        if let Err(err) = self.rollback() {
            warn!(transaction = %self.id, error = %err, "revert of dropped transaction failed");
        }
    }
}

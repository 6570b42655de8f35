//! Process-wide workflow state.
//!
//! The store owns the unpublished set, the published entries, the media
//! library and the table of pending transactions. Mutations of entry state
//! go through `begin`, `commit` and `revert`; loaders write through the
//! narrower helpers on the individual sets.

mod published;
mod unpublished;

pub use published::PublishedEntries;
pub use unpublished::{InFlight, LoadState, UnpublishedEntrySet, UnpublishedSlot};

use crate::core::{StateHistory, StateTransition, WorkflowStatus};
use crate::media::MediaLibrary;
use crate::model::{Entry, EntryKey};
use crate::transaction::{OptimisticUpdate, Resolution, TransactionError, TransactionId};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Store handle shared by the workflow, its transactions and spawned loads.
pub type SharedStore = Arc<Mutex<WorkflowStore>>;

/// Pre-`begin` state of the entry a transaction touches.
#[derive(Clone, Debug, PartialEq)]
pub struct EntrySnapshot {
    pub key: EntryKey,
    unpublished: Option<UnpublishedSlot>,
    position: Option<usize>,
    published: Option<Entry>,
}

#[derive(Clone, Debug, PartialEq)]
struct PendingTransaction {
    update: OptimisticUpdate,
    snapshot: EntrySnapshot,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowStore {
    unpublished: UnpublishedEntrySet,
    published: PublishedEntries,
    media: MediaLibrary,
    pending: HashMap<TransactionId, PendingTransaction>,
    history: HashMap<EntryKey, StateHistory<WorkflowStatus>>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn unpublished(&self) -> &UnpublishedEntrySet {
        &self.unpublished
    }

    pub fn unpublished_mut(&mut self) -> &mut UnpublishedEntrySet {
        &mut self.unpublished
    }

    pub fn published(&self) -> &PublishedEntries {
        &self.published
    }

    pub fn published_mut(&mut self) -> &mut PublishedEntries {
        &mut self.published
    }

    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut MediaLibrary {
        &mut self.media
    }

    /// Published slugs followed by unpublished slugs of `collection`.
    pub fn used_slugs(&self, collection: &str) -> Vec<String> {
        let mut slugs = self.published.slugs(collection);
        slugs.extend(self.unpublished.slugs(collection));
        slugs
    }

    pub fn status_history(&self, key: &EntryKey) -> Option<&StateHistory<WorkflowStatus>> {
        self.history.get(key)
    }

    pub fn is_pending(&self, id: &TransactionId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn snapshot(&self, id: &TransactionId) -> Option<&EntrySnapshot> {
        self.pending.get(id).map(|pending| &pending.snapshot)
    }

    fn capture(&self, key: &EntryKey) -> EntrySnapshot {
        let (unpublished, position) = self.unpublished.capture(key);
        EntrySnapshot {
            key: key.clone(),
            unpublished,
            position,
            published: self.published.get(key).cloned(),
        }
    }

    /// Records a snapshot under `id` and applies `update` optimistically.
    pub fn begin(
        &mut self,
        id: TransactionId,
        update: OptimisticUpdate,
    ) -> Result<(), TransactionError> {
        if self.pending.contains_key(&id) {
            return Err(TransactionError::DuplicateTransaction(id));
        }

        let snapshot = self.capture(&update.key());
        self.apply(&update);
        self.pending.insert(id, PendingTransaction { update, snapshot });
        Ok(())
    }

    fn apply(&mut self, update: &OptimisticUpdate) {
        match update {
            OptimisticUpdate::Persist { entry } => {
                let mut entry = entry.clone();
                let current = self.unpublished.entry(&entry.key()).and_then(|e| e.status);
                entry.status = Some(current.or(entry.status).unwrap_or_default());
                self.unpublished.insert(entry, Some(InFlight::Persisting));
            }
            OptimisticUpdate::StatusChange { key, to, .. } => {
                if let Some(slot) = self.unpublished.get_mut(key) {
                    slot.entry.status = Some(*to);
                    slot.in_flight = Some(InFlight::UpdatingStatus);
                }
            }
            OptimisticUpdate::Publish { key } => self.mark(key, InFlight::Publishing),
            OptimisticUpdate::Delete { key } => self.mark(key, InFlight::Deleting),
            OptimisticUpdate::Unpublish { entry } => {
                let mut entry = entry.clone();
                entry.status = Some(WorkflowStatus::PendingPublish);
                self.unpublished.insert(entry, Some(InFlight::Persisting));
            }
        }
    }

    fn mark(&mut self, key: &EntryKey, in_flight: InFlight) {
        if let Some(slot) = self.unpublished.get_mut(key) {
            slot.in_flight = Some(in_flight);
        }
    }

    /// Adopts `resolution` and discards the snapshot of `id`.
    ///
    /// Returns the key the entry lives under after the commit.
    pub fn commit(
        &mut self,
        id: TransactionId,
        resolution: Resolution,
    ) -> Result<EntryKey, TransactionError> {
        let pending = self
            .pending
            .remove(&id)
            .ok_or(TransactionError::UnknownTransaction(id))?;
        let key = pending.snapshot.key;

        let settled = match pending.update {
            OptimisticUpdate::Persist { .. } => self.settle_persisted(&key, resolution),
            OptimisticUpdate::StatusChange { key, from, to } => {
                if let Some(slot) = self.unpublished.get_mut(&key) {
                    slot.in_flight = None;
                }
                let history = self.history.entry(key.clone()).or_default();
                *history = history.record(StateTransition {
                    from,
                    to,
                    timestamp: Utc::now(),
                    transaction: id,
                });
                key
            }
            OptimisticUpdate::Publish { key } => {
                self.unpublished.remove(&key);
                key
            }
            OptimisticUpdate::Delete { key } => {
                self.unpublished.remove(&key);
                self.media.clear_draft_entry_media(&key);
                key
            }
            OptimisticUpdate::Unpublish { .. } => {
                self.published.remove(&key);
                self.settle_persisted(&key, resolution)
            }
        };
        Ok(settled)
    }

    fn settle_persisted(&mut self, key: &EntryKey, resolution: Resolution) -> EntryKey {
        let Resolution::Persisted { slug, path } = resolution else {
            if let Some(slot) = self.unpublished.get_mut(key) {
                slot.in_flight = None;
            }
            return key.clone();
        };

        if slug == key.slug {
            if let Some(slot) = self.unpublished.get_mut(key) {
                slot.entry.path = path;
                slot.in_flight = None;
            }
            return key.clone();
        }

        match self.unpublished.remove(key) {
            Some(slot) => {
                let mut entry = slot.entry;
                entry.slug = slug;
                entry.path = path;
                let renamed = entry.key();
                self.unpublished.insert(entry, None);
                renamed
            }
            None => EntryKey::new(key.collection.clone(), slug),
        }
    }

    /// Restores the snapshot of `id` and discards it.
    pub fn revert(&mut self, id: TransactionId) -> Result<EntryKey, TransactionError> {
        let pending = self
            .pending
            .remove(&id)
            .ok_or(TransactionError::UnknownTransaction(id))?;
        let snapshot = pending.snapshot;

        self.unpublished
            .restore(&snapshot.key, snapshot.unpublished, snapshot.position);
        self.published.restore(&snapshot.key, snapshot.published);
        Ok(snapshot.key)
    }
}

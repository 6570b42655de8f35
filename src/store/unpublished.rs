//! The process-wide set of entries under editorial review.

use crate::model::{Entry, EntryKey};
use std::collections::BTreeMap;

/// Population state of the unpublished set.
///
/// The full set is fetched once per session. `Unloaded` and `Failed` may
/// move to `Loading`; `Loading` settles into `Loaded` or `Failed`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    /// Whether a full fetch may start from this state.
    pub fn needs_load(&self) -> bool {
        matches!(self, Self::Unloaded | Self::Failed)
    }
}

/// Backend call currently in flight for an entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InFlight {
    Persisting,
    UpdatingStatus,
    Publishing,
    Deleting,
}

/// One entry of the unpublished set.
#[derive(Clone, PartialEq, Debug)]
pub struct UnpublishedSlot {
    pub entry: Entry,
    pub in_flight: Option<InFlight>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnpublishedEntrySet {
    entries: BTreeMap<EntryKey, UnpublishedSlot>,
    ids: Vec<EntryKey>,
    pages: Option<u32>,
    load_state: LoadState,
}

impl UnpublishedEntrySet {
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Takes the `Unloaded | Failed -> Loading` transition.
    ///
    /// Returns `false` when a fetch is running or the set is loaded.
    pub fn begin_loading(&mut self) -> bool {
        if !self.load_state.needs_load() {
            return false;
        }
        self.load_state = LoadState::Loading;
        true
    }

    pub fn mark_failed(&mut self) {
        self.load_state = LoadState::Failed;
    }

    /// Merges a full fetch into the set.
    ///
    /// Entries with a call in flight keep their optimistic state.
    pub fn populate(&mut self, entries: Vec<Entry>, pages: u32) {
        for entry in entries {
            let key = entry.key();
            let busy = self
                .entries
                .get(&key)
                .is_some_and(|slot| slot.in_flight.is_some());
            if !busy {
                self.insert(entry, None);
            }
        }
        self.pages = Some(pages);
        self.load_state = LoadState::Loaded;
    }

    pub fn get(&self, key: &EntryKey) -> Option<&UnpublishedSlot> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &EntryKey) -> Option<&mut UnpublishedSlot> {
        self.entries.get_mut(key)
    }

    pub fn entry(&self, key: &EntryKey) -> Option<&Entry> {
        self.entries.get(key).map(|slot| &slot.entry)
    }

    /// Inserts or replaces the entry under its own key.
    pub fn insert(&mut self, entry: Entry, in_flight: Option<InFlight>) {
        let key = entry.key();
        if !self.ids.contains(&key) {
            self.ids.push(key.clone());
        }
        self.entries.insert(key, UnpublishedSlot { entry, in_flight });
    }

    pub fn remove(&mut self, key: &EntryKey) -> Option<UnpublishedSlot> {
        self.ids.retain(|id| id != key);
        self.entries.remove(key)
    }

    /// Slot and list position of `key`, for snapshots.
    pub(crate) fn capture(&self, key: &EntryKey) -> (Option<UnpublishedSlot>, Option<usize>) {
        (
            self.entries.get(key).cloned(),
            self.ids.iter().position(|id| id == key),
        )
    }

    /// Puts a captured slot back, at its former list position.
    pub(crate) fn restore(
        &mut self,
        key: &EntryKey,
        slot: Option<UnpublishedSlot>,
        position: Option<usize>,
    ) {
        self.ids.retain(|id| id != key);
        match slot {
            Some(slot) => {
                let at = position.unwrap_or(self.ids.len()).min(self.ids.len());
                self.ids.insert(at, key.clone());
                self.entries.insert(key.clone(), slot);
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    /// Slugs of `collection`, in list order.
    pub fn slugs(&self, collection: &str) -> Vec<String> {
        self.ids
            .iter()
            .filter(|key| key.collection == collection)
            .map(|key| key.slug.clone())
            .collect()
    }

    pub fn ids(&self) -> &[EntryKey] {
        &self.ids
    }

    pub fn pages(&self) -> Option<u32> {
        self.pages
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.ids
            .iter()
            .filter_map(|key| self.entries.get(key).map(|slot| &slot.entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

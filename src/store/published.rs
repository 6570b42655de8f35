//! Published entries known to the process.

use crate::model::{Entry, EntryKey};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublishedEntries {
    entries: BTreeMap<EntryKey, Entry>,
}

impl PublishedEntries {
    pub fn get(&self, key: &EntryKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, entry: Entry) {
        self.entries.insert(entry.key(), entry);
    }

    pub fn remove(&mut self, key: &EntryKey) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub(crate) fn restore(&mut self, key: &EntryKey, entry: Option<Entry>) {
        match entry {
            Some(entry) => {
                self.entries.insert(key.clone(), entry);
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    pub fn slugs(&self, collection: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| key.collection == collection)
            .map(|key| key.slug.clone())
            .collect()
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

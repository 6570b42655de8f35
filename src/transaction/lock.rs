//! Entry-scoped serialization of transactions.
//!
//! Without it, a second transaction begun on an entry before the first one
//! settles snapshots state that is already optimistic, and its revert
//! restores that optimistic state instead of the last confirmed one.

use crate::model::EntryKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per entry key, created on demand.
#[derive(Debug, Default)]
pub struct EntryLocks {
    enabled: bool,
    locks: Mutex<HashMap<EntryKey, Arc<AsyncMutex<()>>>>,
}

/// Held for the lifetime of one transaction on one entry.
#[derive(Debug)]
pub struct EntryGuard {
    _guard: Option<OwnedMutexGuard<()>>,
}

impl EntryLocks {
    /// Creates the lock table. With `enabled == false` acquiring never waits.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Waits until no other transaction holds `key`.
    pub async fn acquire(&self, key: &EntryKey) -> EntryGuard {
        if !self.enabled {
            return EntryGuard { _guard: None };
        }

        let lock = {
            let mut locks = self.locks.lock();
            // Locks nobody holds or waits on are only referenced by the table.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        EntryGuard {
            _guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of keys with a live lock.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn second_acquire_waits_for_the_first_guard() {
        let locks = Arc::new(EntryLocks::new(true));
        let key = EntryKey::new("posts", "hello-world");

        let first = locks.acquire(&key).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            let key = key.clone();
            tokio::spawn(async move {
                let _second = locks.acquire(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_entries_do_not_block_each_other() {
        let locks = EntryLocks::new(true);
        let _a = locks.acquire(&EntryKey::new("posts", "a")).await;
        let _b = locks.acquire(&EntryKey::new("posts", "b")).await;
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = EntryLocks::new(true);
        drop(locks.acquire(&EntryKey::new("posts", "a")).await);
        let _b = locks.acquire(&EntryKey::new("posts", "b")).await;
        assert_eq!(locks.locks.lock().len(), 1);
    }

    #[tokio::test]
    async fn disabled_locks_never_wait() {
        let locks = EntryLocks::new(false);
        let key = EntryKey::new("posts", "a");
        let _first = locks.acquire(&key).await;
        let _second = locks.acquire(&key).await;
        assert_eq!(locks.active(), 0);
    }
}

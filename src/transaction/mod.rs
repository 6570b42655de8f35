//! Optimistic transactions over the workflow store.
//!
//! Each mutating workflow call:
//! 1. `begin`s a transaction, applying its optimistic update synchronously
//! 2. awaits the backend
//! 3. `commit`s the authoritative result, or `revert`s to the snapshot
//!
//! Transactions on the same entry are serialized through [`EntryLocks`].

mod error;
mod id;
mod lock;
mod manager;
mod update;

pub use error::TransactionError;
pub use id::TransactionId;
pub use lock::{EntryGuard, EntryLocks};
pub use manager::{Transaction, TransactionManager};
pub use update::{Operation, OptimisticUpdate, Resolution};

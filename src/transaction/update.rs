//! Optimistic payloads and their authoritative resolutions.

use crate::core::WorkflowStatus;
use crate::model::{Entry, EntryKey};
use serde::Serialize;
use std::fmt;

/// Kind of workflow mutation a transaction carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Persist,
    StatusChange,
    Publish,
    Delete,
    Unpublish,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Persist => "persist",
            Self::StatusChange => "status_change",
            Self::Publish => "publish",
            Self::Delete => "delete",
            Self::Unpublish => "unpublish",
        };
        f.write_str(name)
    }
}

/// State mutation applied at `begin`, before the backend is called.
#[derive(Clone, PartialEq, Debug)]
pub enum OptimisticUpdate {
    /// Upsert the draft into the unpublished set.
    Persist { entry: Entry },
    /// Move an unpublished entry to another review stage.
    StatusChange {
        key: EntryKey,
        from: WorkflowStatus,
        to: WorkflowStatus,
    },
    /// Mark an unpublished entry as being published.
    Publish { key: EntryKey },
    /// Mark an unpublished entry as being deleted.
    Delete { key: EntryKey },
    /// Copy a published entry back into the unpublished set.
    Unpublish { entry: Entry },
}

impl OptimisticUpdate {
    /// Entry whose state the update touches.
    pub fn key(&self) -> EntryKey {
        match self {
            Self::Persist { entry } | Self::Unpublish { entry } => entry.key(),
            Self::StatusChange { key, .. } | Self::Publish { key } | Self::Delete { key } => {
                key.clone()
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Persist { .. } => Operation::Persist,
            Self::StatusChange { .. } => Operation::StatusChange,
            Self::Publish { .. } => Operation::Publish,
            Self::Delete { .. } => Operation::Delete,
            Self::Unpublish { .. } => Operation::Unpublish,
        }
    }
}

/// Authoritative outcome adopted at `commit`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Resolution {
    /// The backend accepted the payload as is.
    Confirmed,
    /// The backend stored the entry under `slug` at repository `path`.
    Persisted { slug: String, path: String },
}

//! Results of workflow operations that handle their own failures.
//!
//! Failures in these operations have already been reverted, logged and
//! notified by the time the caller sees them; the outcome only reports
//! what happened.

use crate::error::WorkflowError;
use crate::model::Entry;

/// How a mutating operation settled.
#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    /// Nothing to do; no transaction was begun.
    Skipped,
    /// The backend accepted the change and the transaction committed.
    Committed,
    /// The backend rejected the change and the transaction reverted.
    Reverted(WorkflowError),
    /// The operation stopped before the backend result could be applied.
    Aborted(WorkflowError),
}

impl Settlement {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Reverted(err) | Self::Aborted(err) => Some(err),
            Self::Skipped | Self::Committed => None,
        }
    }
}

/// Result of loading the full unpublished set.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// Not in editorial mode, or already loading or loaded.
    Skipped,
    Loaded { count: usize, pages: u32 },
    Failed(WorkflowError),
}

/// Result of loading a single entry.
#[derive(Clone, Debug, PartialEq)]
pub enum EntryLoadOutcome {
    /// Stored in the unpublished set.
    Unpublished(Entry),
    /// Stored in the published entries, directly or after a redirect.
    Published(Entry),
    Failed(WorkflowError),
}

impl EntryLoadOutcome {
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Unpublished(entry) | Self::Published(entry) => Some(entry),
            Self::Failed(_) => None,
        }
    }
}

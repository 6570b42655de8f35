//! Editorial review states.

use super::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review stage of an unpublished entry.
///
/// Published entries carry no status: publishing moves an entry out of the
/// workflow altogether.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
    PendingReview,
    PendingPublish,
}

impl WorkflowStatus {
    /// All statuses in review order.
    pub const ALL: [WorkflowStatus; 3] = [
        WorkflowStatus::Draft,
        WorkflowStatus::PendingReview,
        WorkflowStatus::PendingPublish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::PendingPublish => "pending_publish",
        }
    }
}

impl State for WorkflowStatus {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::PendingPublish)
    }
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown workflow status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for WorkflowStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

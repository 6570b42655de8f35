//! The `State` trait shared by every review-state type.
//!
//! Workflow states are plain values: the trait only exposes pure
//! inspection methods, never behavior that touches the backend.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for review states an entry can occupy.
///
/// # Required Traits
///
/// - `Clone`: states are copied into transaction snapshots and history
/// - `PartialEq`: the identity guard compares the old and new state
/// - `Serialize` + `Deserialize`: states travel to and from the backend
///
/// # Example
///
/// ```rust
/// use editorial::core::{State, WorkflowStatus};
///
/// assert_eq!(WorkflowStatus::PendingReview.name(), "pending_review");
/// assert!(!WorkflowStatus::Draft.is_final());
/// assert!(WorkflowStatus::PendingPublish.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Stable wire name of the state.
    fn name(&self) -> &str;

    /// Whether the state is the last stop before leaving the workflow.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Review {
        Open,
        Approved,
    }

    impl State for Review {
        fn name(&self) -> &str {
            match self {
                Self::Open => "open",
                Self::Approved => "approved",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Approved)
        }
    }

    #[test]
    fn default_is_final_can_be_overridden() {
        assert!(!Review::Open.is_final());
        assert!(Review::Approved.is_final());
    }

    #[test]
    fn state_serializes_correctly() {
        let state = Review::Approved;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: Review = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
        assert_eq!(deserialized.name(), "approved");
    }
}

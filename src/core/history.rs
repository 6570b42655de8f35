//! Status transition history.
//!
//! Every committed status change is recorded against the entry it moved.
//! Histories are immutable values: `record` returns a new history.

use super::state::State;
use crate::transaction::TransactionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed status transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transaction committed
    pub timestamp: DateTime<Utc>,
    /// Transaction that carried the change
    pub transaction: TransactionId,
}

/// Ordered history of committed transitions for one entry.
///
/// # Example
///
/// ```rust
/// use editorial::core::{StateHistory, StateTransition, WorkflowStatus};
/// use editorial::transaction::TransactionId;
/// use chrono::Utc;
///
/// let history = StateHistory::new().record(StateTransition {
///     from: WorkflowStatus::Draft,
///     to: WorkflowStatus::PendingReview,
///     timestamp: Utc::now(),
///     transaction: TransactionId::new(),
/// });
///
/// assert_eq!(
///     history.get_path(),
///     vec![&WorkflowStatus::Draft, &WorkflowStatus::PendingReview]
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The receiver is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the initial state followed by the `to` state of each
    /// transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time elapsed between the first and the last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// The state reached by the most recent transition.
    pub fn current(&self) -> Option<&S> {
        self.transitions.last().map(|t| &t.to)
    }

    /// Get all transitions in commit order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}

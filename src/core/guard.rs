//! Guard predicates for controlling status transitions.
//!
//! A guard is evaluated before any transaction begins. When it rejects a
//! transition nothing happens: no optimistic mutation, no backend call.

use super::state::State;
use std::marker::PhantomData;

/// Pure predicate over a `(from, to)` pair that decides whether a
/// transition is worth executing.
///
/// # Example
///
/// ```rust
/// use editorial::core::{Guard, WorkflowStatus};
///
/// let guard = Guard::<WorkflowStatus>::distinct();
///
/// assert!(guard.check(&WorkflowStatus::Draft, &WorkflowStatus::PendingReview));
/// assert!(!guard.check(&WorkflowStatus::Draft, &WorkflowStatus::Draft));
/// ```
pub struct Guard<S: State> {
    predicate: Box<dyn Fn(&S, &S) -> bool + Send + Sync>,
    _phantom: PhantomData<S>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S, &S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Guard that rejects identity transitions (`X -> X`).
    pub fn distinct() -> Self {
        Self::new(|from: &S, to: &S| from != to)
    }

    /// Check if the guard allows moving from `from` to `to`.
    pub fn check(&self, from: &S, to: &S) -> bool {
        (self.predicate)(from, to)
    }
}

impl<S: State> std::fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

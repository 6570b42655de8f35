//! Review-state types and the pure logic around them.
//!
//! - `WorkflowStatus`, the review stage of an unpublished entry
//! - `Guard` predicates evaluated before a status transaction begins
//! - Immutable per-entry status history
//!
//! Nothing in this module performs I/O.

mod guard;
mod history;
mod state;
mod status;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
pub use status::{UnknownStatus, WorkflowStatus};

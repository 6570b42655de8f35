//! Builder API for assembling the workflow engine from its collaborators.

pub mod error;
pub mod workflow;

pub use error::BuildError;
pub use workflow::EditorialWorkflowBuilder;

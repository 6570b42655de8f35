//! Workflow error taxonomy.

use crate::backend::BackendError;
use crate::model::{EntryKey, FieldError};
use crate::transaction::TransactionError;
use thiserror::Error;

/// Errors surfaced by workflow operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    /// The draft failed the validation gate; nothing was sent.
    #[error("entry failed validation with {} error(s)", .errors.len())]
    Validation {
        errors: Vec<FieldError>,
        /// Whether a required field is absent or empty.
        missing_required: bool,
    },

    #[error("entry {collection}.{slug} is not under the editorial workflow")]
    NotUnderWorkflow { collection: String, slug: String },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The published entry was deleted but could not be recreated for review.
    #[error("entry was unpublished but not recreated for review: {source}")]
    PartialUnpublish { source: BackendError },

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("entry {0} not found")]
    EntryNotFound(EntryKey),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl WorkflowError {
    /// Whether this is a validation failure caused by a missing required field.
    pub fn is_missing_required(&self) -> bool {
        matches!(
            self,
            Self::Validation {
                missing_required: true,
                ..
            }
        )
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn validation_message_counts_errors() {
        let err = WorkflowError::Validation {
            errors: vec![FieldError::presence("title"), FieldError::presence("tags")],
            missing_required: true,
        };
        assert_eq!(err.to_string(), "entry failed validation with 2 error(s)");
        assert!(err.is_missing_required());
    }

    #[test]
    fn partial_unpublish_keeps_backend_cause() {
        let err = WorkflowError::PartialUnpublish {
            source: BackendError::failed("branch protected"),
        };
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("branch protected".to_string())
        );
    }

    #[test]
    fn backend_errors_convert() {
        let err: WorkflowError = BackendError::failed("offline").into();
        assert_eq!(err, WorkflowError::Backend(BackendError::failed("offline")));
        assert!(!err.is_missing_required());
    }
}

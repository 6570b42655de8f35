//! Backend error types.

use thiserror::Error;

/// Errors reported by a backend adapter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The entry has no pending review; it is published or was never saved.
    #[error("entry is not under the editorial workflow")]
    NotUnderEditorialWorkflow {
        /// Whether the caller should read the entry as published instead.
        redirect: bool,
    },

    #[error("{message}")]
    Failed {
        message: String,
        details: Option<String>,
    },
}

impl BackendError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(self, details: impl Into<String>) -> Self {
        match self {
            Self::Failed { message, .. } => Self::Failed {
                message,
                details: Some(details.into()),
            },
            other => other,
        }
    }

    /// Whether the caller should fall back to reading the published entry.
    pub fn redirects(&self) -> bool {
        matches!(self, Self::NotUnderEditorialWorkflow { redirect: true })
    }
}

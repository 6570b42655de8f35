//! The entry currently open in the editor, with its reported field errors.

use super::entry::{Entry, MediaFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a field validation error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A required field is missing or empty.
    Presence,
    /// Value does not match the field pattern.
    Pattern,
    /// Value is outside the allowed range.
    Range,
    /// Widget-specific validation failed.
    Custom,
}

/// One validation error reported for one field.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn presence(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{field} is required");
        Self::new(field, ValidationErrorKind::Presence, message)
    }

    pub fn is_presence(&self) -> bool {
        self.kind == ValidationErrorKind::Presence
    }
}

/// Editing state of one entry.
#[derive(Clone, PartialEq, Debug)]
pub struct EntryDraft {
    pub entry: Entry,
    /// Errors reported by the editor widgets, by field name.
    pub field_errors: BTreeMap<String, Vec<FieldError>>,
    /// Media files attached while editing.
    pub media_files: Vec<MediaFile>,
}

impl EntryDraft {
    pub fn new(entry: Entry) -> Self {
        let media_files = entry.media_files.clone();
        Self {
            entry,
            field_errors: BTreeMap::new(),
            media_files,
        }
    }

    pub fn with_error(mut self, error: FieldError) -> Self {
        self.field_errors
            .entry(error.field.clone())
            .or_default()
            .push(error);
        self
    }

    pub fn with_media(mut self, file: MediaFile) -> Self {
        self.media_files.push(file);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.field_errors.values().any(|errors| !errors.is_empty())
    }

    /// Errors in field order.
    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.field_errors.values().flatten()
    }
}

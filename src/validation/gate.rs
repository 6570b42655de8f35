//! Field checks for entry drafts.

use crate::model::{Collection, EntryDraft, FieldError};
use serde_json::Value;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for draft check functions
pub type DraftCheck = Box<
    dyn Fn(&Collection, &EntryDraft) -> Validation<(), NonEmptyVec<FieldError>> + Send + Sync,
>;

/// Checks a draft must pass before it reaches the backend.
///
/// The default gate fails on every error the editor reported for the draft
/// and on every required collection field that is absent or empty.
pub struct ValidationGate {
    checks: Vec<DraftCheck>,
}

impl ValidationGate {
    pub fn new() -> Self {
        Self::empty()
            .with_check(reported_errors)
            .with_check(required_fields)
    }

    /// A gate without any checks.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Collection, &EntryDraft) -> Validation<(), NonEmptyVec<FieldError>>
            + Send
            + Sync
            + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Runs every check, accumulating ALL failures.
    pub fn check(
        &self,
        collection: &Collection,
        draft: &EntryDraft,
    ) -> Validation<(), NonEmptyVec<FieldError>> {
        let results: Vec<Validation<(), NonEmptyVec<FieldError>>> = self
            .checks
            .iter()
            .map(|check| check(collection, draft))
            .collect();
        Validation::all_vec(results).map(|_| ())
    }
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationGate")
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Whether any accumulated error is a presence error.
pub fn has_presence_error(errors: &NonEmptyVec<FieldError>) -> bool {
    errors.iter().any(FieldError::is_presence)
}

/// Absent-equivalent values: null, blank strings and empty lists.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn reported_errors(
    _collection: &Collection,
    draft: &EntryDraft,
) -> Validation<(), NonEmptyVec<FieldError>> {
    let checks: Vec<Validation<(), NonEmptyVec<FieldError>>> = draft
        .errors()
        .map(|error| Validation::fail(error.clone()))
        .collect();
    Validation::all_vec(checks).map(|_| ())
}

fn required_fields(
    collection: &Collection,
    draft: &EntryDraft,
) -> Validation<(), NonEmptyVec<FieldError>> {
    let checks: Vec<Validation<(), NonEmptyVec<FieldError>>> = collection
        .fields
        .iter()
        .filter(|field| field.required)
        // already reported by the editor
        .filter(|field| {
            !draft
                .field_errors
                .get(&field.name)
                .is_some_and(|errors| errors.iter().any(FieldError::is_presence))
        })
        .map(|field| match draft.entry.data.get(&field.name) {
            Some(value) if !is_empty_value(value) => Validation::success(()),
            _ => Validation::fail(FieldError::presence(field.name.clone())),
        })
        .collect();
    Validation::all_vec(checks).map(|_| ())
}

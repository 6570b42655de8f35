//! Validation gate run before an entry is persisted.
//!
//! Uses `Validation` to accumulate every field error of a draft instead of
//! stopping at the first one.

mod gate;

pub use gate::{has_presence_error, is_empty_value, DraftCheck, ValidationGate};

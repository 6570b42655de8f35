//! Content data model shared by the workflow and backend adapters.

mod collection;
mod draft;
mod entry;

pub use collection::{Collection, Field};
pub use draft::{EntryDraft, FieldError, ValidationErrorKind};
pub use entry::{Entry, EntryData, EntryKey, MediaFile};

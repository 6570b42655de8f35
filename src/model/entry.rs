//! Entries, entry keys and media file references.

use crate::core::WorkflowStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered field data of an entry. Keys are unique and keep insertion order.
pub type EntryData = serde_json::Map<String, serde_json::Value>;

/// Identity of an entry: collection name plus slug.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct EntryKey {
    pub collection: String,
    pub slug: String,
}

impl EntryKey {
    pub fn new(collection: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.slug)
    }
}

/// A media file bound to an entry.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: String,
    pub sha: String,
    pub display_url: String,
    pub path: String,
    pub name: String,
    pub size: u64,
    /// Opaque reference to locally held file content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// A single content item.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub collection: String,
    pub slug: String,
    pub path: String,
    #[serde(default)]
    pub data: EntryData,
    #[serde(default)]
    pub media_files: Vec<MediaFile>,
    /// Review status; `None` for entries outside the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
}

impl Entry {
    pub fn new(collection: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            slug: slug.into(),
            path: String::new(),
            data: EntryData::new(),
            media_files: Vec::new(),
            status: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(name.into(), value);
        self
    }

    pub fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_media(mut self, file: MediaFile) -> Self {
        self.media_files.push(file);
        self
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.collection.clone(), self.slug.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_keeps_insertion_order() {
        let entry = Entry::new("posts", "hello-world")
            .with_field("title", json!("Hello"))
            .with_field("body", json!("..."))
            .with_field("author", json!("ada"));

        let keys: Vec<&str> = entry.data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "body", "author"]);
    }

    #[test]
    fn key_combines_collection_and_slug() {
        let entry = Entry::new("posts", "hello-world");
        assert_eq!(entry.key(), EntryKey::new("posts", "hello-world"));
        assert_eq!(entry.key().to_string(), "posts.hello-world");
    }

    #[test]
    fn status_is_omitted_for_published_entries() {
        let entry = Entry::new("posts", "hello-world");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("status").is_none());

        let drafted = entry.with_status(WorkflowStatus::PendingReview);
        let json = serde_json::to_value(&drafted).unwrap();
        assert_eq!(json["status"], json!("pending_review"));
    }
}

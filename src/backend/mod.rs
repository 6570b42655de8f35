//! Content storage providers.
//!
//! The workflow talks to exactly one provider, chosen from configuration
//! through the [`BackendRegistry`] when the workflow is built.

mod error;
mod memory;
mod registry;

pub use error::BackendError;
pub use memory::{BackendCall, BackendOperation, InMemoryBackend};
pub use registry::{BackendFactory, BackendRegistry};

use crate::config::{Integration, WorkflowConfig};
use crate::core::WorkflowStatus;
use crate::media::AssetDescriptor;
use crate::model::{Collection, Entry, EntryDraft, MediaFile};
use async_trait::async_trait;

/// A page of unpublished entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnpublishedEntries {
    pub entries: Vec<Entry>,
    /// Number of pages the provider holds.
    pub pagination: u32,
}

/// Result of publishing an unpublished entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublishResponse {
    /// Media files that are now part of the published site.
    pub media_files: Vec<MediaFile>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PersistOptions {
    /// Status to store the entry under; providers default to `draft`.
    pub status: Option<WorkflowStatus>,
}

/// Everything a provider needs to write an entry.
#[derive(Clone, Copy, Debug)]
pub struct PersistRequest<'a> {
    pub config: &'a WorkflowConfig,
    pub collection: &'a Collection,
    pub draft: &'a EntryDraft,
    pub assets: &'a [AssetDescriptor],
    pub integrations: &'a [Integration],
    /// Slugs a newly generated slug must not collide with.
    pub used_slugs: &'a [String],
    pub options: PersistOptions,
}

/// Capabilities of a content storage provider.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Registered provider name.
    fn name(&self) -> &str;

    /// All entries under review in `collections`.
    async fn unpublished_entries(
        &self,
        collections: &[Collection],
    ) -> Result<UnpublishedEntries, BackendError>;

    /// One entry under review, with its media files.
    async fn unpublished_entry(
        &self,
        collection: &Collection,
        slug: &str,
    ) -> Result<Entry, BackendError>;

    /// One published entry.
    async fn entry(&self, collection: &Collection, slug: &str) -> Result<Entry, BackendError>;

    /// Writes a new entry and returns its slug.
    async fn persist_entry(&self, request: PersistRequest<'_>) -> Result<String, BackendError>;

    /// Writes an entry already under review and returns its slug.
    async fn persist_unpublished_entry(
        &self,
        request: PersistRequest<'_>,
    ) -> Result<String, BackendError>;

    async fn update_unpublished_entry_status(
        &self,
        collection: &str,
        slug: &str,
        status: WorkflowStatus,
    ) -> Result<(), BackendError>;

    async fn publish_unpublished_entry(
        &self,
        collection: &str,
        slug: &str,
    ) -> Result<PublishResponse, BackendError>;

    async fn delete_unpublished_entry(&self, collection: &str, slug: &str)
        -> Result<(), BackendError>;

    /// Removes a published entry.
    async fn delete_entry(
        &self,
        config: &WorkflowConfig,
        collection: &Collection,
        slug: &str,
    ) -> Result<(), BackendError>;
}

//! In-process provider registered as `test-repo`.
//!
//! Holds published and unpublished entries in memory with editorial
//! semantics. Every call is logged, and failures can be queued per
//! operation to exercise error paths.

use super::{
    BackendAdapter, BackendError, PersistOptions, PersistRequest, PublishResponse,
    UnpublishedEntries,
};
use crate::config::WorkflowConfig;
use crate::core::WorkflowStatus;
use crate::media::AssetDescriptor;
use crate::model::{Collection, Entry, EntryKey};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, trace};

const PAGE_SIZE: usize = 20;

/// Provider operations, for the call log and fault injection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BackendOperation {
    UnpublishedEntries,
    UnpublishedEntry,
    Entry,
    PersistEntry,
    PersistUnpublishedEntry,
    UpdateStatus,
    Publish,
    DeleteUnpublishedEntry,
    DeleteEntry,
}

/// One logged provider call.
#[derive(Clone, PartialEq, Debug)]
pub struct BackendCall {
    pub operation: BackendOperation,
    pub key: Option<EntryKey>,
    pub status: Option<WorkflowStatus>,
}

impl BackendCall {
    fn new(operation: BackendOperation) -> Self {
        Self {
            operation,
            key: None,
            status: None,
        }
    }

    fn on(mut self, collection: &str, slug: &str) -> Self {
        self.key = Some(EntryKey::new(collection, slug));
        self
    }

    fn with_status(mut self, status: Option<WorkflowStatus>) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Default)]
struct Repository {
    published: BTreeMap<EntryKey, Entry>,
    unpublished: BTreeMap<EntryKey, Entry>,
    assets: Vec<AssetDescriptor>,
    calls: Vec<BackendCall>,
    faults: HashMap<BackendOperation, VecDeque<BackendError>>,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    repo: Mutex<Repository>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    pub const NAME: &'static str = "test-repo";

    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency` before it takes effect.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_published(self, entry: Entry) -> Self {
        self.repo.lock().published.insert(entry.key(), entry);
        self
    }

    pub fn with_unpublished(self, entry: Entry) -> Self {
        let mut entry = entry;
        entry.status.get_or_insert(WorkflowStatus::Draft);
        self.repo.lock().unpublished.insert(entry.key(), entry);
        self
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: BackendOperation, error: BackendError) {
        self.repo
            .lock()
            .faults
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.repo.lock().calls.clone()
    }

    pub fn calls_of(&self, operation: BackendOperation) -> Vec<BackendCall> {
        self.repo
            .lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.repo.lock().calls.clear();
    }

    pub fn published(&self, key: &EntryKey) -> Option<Entry> {
        self.repo.lock().published.get(key).cloned()
    }

    pub fn unpublished(&self, key: &EntryKey) -> Option<Entry> {
        self.repo.lock().unpublished.get(key).cloned()
    }

    /// Assets uploaded with persisted entries.
    pub fn assets(&self) -> Vec<AssetDescriptor> {
        self.repo.lock().assets.clone()
    }

    /// Logs `call`, waits out the latency and reports any queued fault.
    async fn enter(&self, call: BackendCall) -> Result<(), BackendError> {
        let fault = {
            let mut repo = self.repo.lock();
            let fault = repo
                .faults
                .get_mut(&call.operation)
                .and_then(VecDeque::pop_front);
            trace!(operation = ?call.operation, key = ?call.key, "backend call");
            repo.calls.push(call);
            fault
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write(
        &self,
        request: &PersistRequest<'_>,
        existing: bool,
    ) -> Result<String, BackendError> {
        let collection = request.collection;
        let draft = &request.draft.entry;
        let mut repo = self.repo.lock();

        let slug = if draft.slug.is_empty() {
            let identifier = draft
                .data
                .get(&collection.identifier_field)
                .and_then(|value| value.as_str())
                .unwrap_or_default();
            unique_slug(&slugify(identifier), request.used_slugs)
        } else {
            draft.slug.clone()
        };
        let key = EntryKey::new(collection.name.clone(), slug.clone());

        let mut entry = draft.clone();
        entry.collection = collection.name.clone();
        entry.slug = slug.clone();
        entry.path = collection.entry_path(&slug);
        entry.media_files = request.draft.media_files.clone();
        repo.assets.extend(request.assets.iter().cloned());

        if !request.config.is_editorial_workflow() {
            entry.status = None;
            repo.published.insert(key, entry);
            return Ok(slug);
        }

        let PersistOptions { status } = request.options;
        let previous = repo.unpublished.get(&key).and_then(|e| e.status);
        if existing && previous.is_none() {
            return Err(BackendError::failed(format!("no pending review for {key}")));
        }
        entry.status = Some(status.or(previous).unwrap_or_default());
        debug!(entry = %key, status = ?entry.status, "entry written");
        repo.unpublished.insert(key, entry);
        Ok(slug)
    }
}

/// Lowercase ASCII slug with single dashes between words.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "entry".to_string()
    } else {
        slug.to_string()
    }
}

/// First of `base`, `base-1`, `base-2`, ... not present in `used`.
fn unique_slug(base: &str, used: &[String]) -> String {
    let taken = |candidate: &str| used.iter().any(|slug| slug == candidate);
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn not_found(collection: &str, slug: &str) -> BackendError {
    BackendError::failed(format!("entry {collection}.{slug} not found"))
}

#[async_trait]
impl BackendAdapter for InMemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn unpublished_entries(
        &self,
        collections: &[Collection],
    ) -> Result<UnpublishedEntries, BackendError> {
        self.enter(BackendCall::new(BackendOperation::UnpublishedEntries))
            .await?;
        let repo = self.repo.lock();
        let entries: Vec<Entry> = repo
            .unpublished
            .values()
            .filter(|entry| collections.iter().any(|c| c.name == entry.collection))
            .cloned()
            .collect();
        let pagination = entries.len().div_ceil(PAGE_SIZE).max(1) as u32;
        Ok(UnpublishedEntries {
            entries,
            pagination,
        })
    }

    async fn unpublished_entry(
        &self,
        collection: &Collection,
        slug: &str,
    ) -> Result<Entry, BackendError> {
        self.enter(BackendCall::new(BackendOperation::UnpublishedEntry).on(&collection.name, slug))
            .await?;
        self.repo
            .lock()
            .unpublished
            .get(&EntryKey::new(collection.name.clone(), slug))
            .cloned()
            .ok_or(BackendError::NotUnderEditorialWorkflow { redirect: true })
    }

    async fn entry(&self, collection: &Collection, slug: &str) -> Result<Entry, BackendError> {
        self.enter(BackendCall::new(BackendOperation::Entry).on(&collection.name, slug))
            .await?;
        self.repo
            .lock()
            .published
            .get(&EntryKey::new(collection.name.clone(), slug))
            .cloned()
            .ok_or_else(|| not_found(&collection.name, slug))
    }

    async fn persist_entry(&self, request: PersistRequest<'_>) -> Result<String, BackendError> {
        let call = BackendCall::new(BackendOperation::PersistEntry)
            .on(&request.collection.name, &request.draft.entry.slug)
            .with_status(request.options.status);
        self.enter(call).await?;
        self.write(&request, false)
    }

    async fn persist_unpublished_entry(
        &self,
        request: PersistRequest<'_>,
    ) -> Result<String, BackendError> {
        let call = BackendCall::new(BackendOperation::PersistUnpublishedEntry)
            .on(&request.collection.name, &request.draft.entry.slug)
            .with_status(request.options.status);
        self.enter(call).await?;
        self.write(&request, true)
    }

    async fn update_unpublished_entry_status(
        &self,
        collection: &str,
        slug: &str,
        status: WorkflowStatus,
    ) -> Result<(), BackendError> {
        let call = BackendCall::new(BackendOperation::UpdateStatus)
            .on(collection, slug)
            .with_status(Some(status));
        self.enter(call).await?;
        let mut repo = self.repo.lock();
        let entry = repo
            .unpublished
            .get_mut(&EntryKey::new(collection, slug))
            .ok_or_else(|| not_found(collection, slug))?;
        entry.status = Some(status);
        Ok(())
    }

    async fn publish_unpublished_entry(
        &self,
        collection: &str,
        slug: &str,
    ) -> Result<PublishResponse, BackendError> {
        self.enter(BackendCall::new(BackendOperation::Publish).on(collection, slug))
            .await?;
        let mut repo = self.repo.lock();
        let key = EntryKey::new(collection, slug);
        let mut entry = repo
            .unpublished
            .remove(&key)
            .ok_or_else(|| not_found(collection, slug))?;
        entry.status = None;
        let media_files = entry.media_files.clone();
        repo.published.insert(key, entry);
        Ok(PublishResponse { media_files })
    }

    async fn delete_unpublished_entry(
        &self,
        collection: &str,
        slug: &str,
    ) -> Result<(), BackendError> {
        self.enter(BackendCall::new(BackendOperation::DeleteUnpublishedEntry).on(collection, slug))
            .await?;
        self.repo
            .lock()
            .unpublished
            .remove(&EntryKey::new(collection, slug))
            .map(|_| ())
            .ok_or_else(|| not_found(collection, slug))
    }

    async fn delete_entry(
        &self,
        _config: &WorkflowConfig,
        collection: &Collection,
        slug: &str,
    ) -> Result<(), BackendError> {
        self.enter(BackendCall::new(BackendOperation::DeleteEntry).on(&collection.name, slug))
            .await?;
        self.repo
            .lock()
            .published
            .remove(&EntryKey::new(collection.name.clone(), slug))
            .map(|_| ())
            .ok_or_else(|| not_found(&collection.name, slug))
    }
}

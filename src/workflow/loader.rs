//! Loading unpublished and published entries into the store.

use super::{EditorialWorkflow, EntryLoadOutcome, LoadOutcome};
use crate::backend::BackendError;
use crate::error::WorkflowError;
use crate::events::WorkflowEvent;
use crate::model::{Collection, EntryKey};
use crate::notify::MessageKey;
use tracing::{debug, info, warn};

impl EditorialWorkflow {
    /// Fetches the full unpublished set once per session.
    ///
    /// Skipped outside editorial mode and while a fetch is running or has
    /// succeeded. A failed fetch may be retried.
    pub async fn load_unpublished_entries(&self, collections: &[Collection]) -> LoadOutcome {
        if !self.inner.config.is_editorial_workflow() {
            return LoadOutcome::Skipped;
        }
        if !self.inner.store.lock().unpublished_mut().begin_loading() {
            return LoadOutcome::Skipped;
        }

        let outcome = self.fetch_unpublished_entries(collections).await;
        if let LoadOutcome::Failed(err) = &outcome {
            self.notify_danger(MessageKey::OnFailToLoadEntries, Some(err.to_string()));
        }
        outcome
    }

    /// Starts the full fetch in the background if the set needs it.
    pub(super) fn spawn_unpublished_load(&self) {
        if !self.inner.config.is_editorial_workflow() {
            return;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!("no async runtime, unpublished entries not prefetched");
                return;
            }
        };
        if !self.inner.store.lock().unpublished_mut().begin_loading() {
            return;
        }

        let workflow = self.clone();
        let collections = self.inner.config.collections.clone();
        handle.spawn(async move {
            let outcome = workflow.fetch_unpublished_entries(&collections).await;
            if let LoadOutcome::Failed(err) = outcome {
                workflow.notify_danger(MessageKey::OnFailToLoadEntries, Some(err.to_string()));
            }
        });
    }

    /// Runs the fetch; the caller has already moved the set to `Loading`.
    async fn fetch_unpublished_entries(&self, collections: &[Collection]) -> LoadOutcome {
        self.inner.events.emit(WorkflowEvent::UnpublishedEntriesLoading);

        match self.inner.backend.unpublished_entries(collections).await {
            Ok(response) => {
                let count = response.entries.len();
                let pages = response.pagination;
                let entries = response
                    .entries
                    .into_iter()
                    .map(|entry| match self.inner.config.collection(&entry.collection) {
                        Some(collection) => self.decode(collection, entry),
                        None => entry,
                    })
                    .collect();
                self.inner
                    .store
                    .lock()
                    .unpublished_mut()
                    .populate(entries, pages);
                info!(count, pages, "unpublished entries loaded");
                self.inner
                    .events
                    .emit(WorkflowEvent::UnpublishedEntriesLoaded { count, pages });
                LoadOutcome::Loaded { count, pages }
            }
            Err(err) => {
                self.inner.store.lock().unpublished_mut().mark_failed();
                warn!(error = %err, "failed to load unpublished entries");
                self.inner.events.emit(WorkflowEvent::UnpublishedEntriesFailed {
                    message: err.to_string(),
                });
                LoadOutcome::Failed(err.into())
            }
        }
    }

    /// Loads one unpublished entry and registers its media as draft media.
    ///
    /// Runs the one-time full fetch first if it never succeeded; a failure
    /// there is ignored. An entry that already left the workflow is loaded
    /// as a published entry instead; one the backend reports as outside
    /// the workflow without a redirect fails with `NotUnderWorkflow`.
    pub async fn load_unpublished_entry(&self, collection: &str, slug: &str) -> EntryLoadOutcome {
        let collection = match self.collection(collection) {
            Ok(collection) => collection,
            Err(err) => {
                self.notify_danger(MessageKey::OnFailToLoadEntries, Some(err.to_string()));
                return EntryLoadOutcome::Failed(err);
            }
        };

        let needs_load = self.inner.store.lock().unpublished_mut().begin_loading();
        if needs_load {
            let collections = self.inner.config.collections.clone();
            if let LoadOutcome::Failed(err) = self.fetch_unpublished_entries(&collections).await {
                debug!(error = %err, "prefetch of unpublished entries failed, continuing");
            }
        }

        let key = EntryKey::new(collection.name.clone(), slug);
        match self.inner.backend.unpublished_entry(&collection, slug).await {
            Ok(entry) => {
                let entry = self.decode(&collection, entry);
                let media = entry.media_files.clone();
                {
                    let mut store = self.inner.store.lock();
                    store.media_mut().add_files(media.clone(), true);
                    store.media_mut().set_draft_entry_media(key.clone(), media);
                    let busy = store
                        .unpublished()
                        .get(&key)
                        .is_some_and(|slot| slot.in_flight.is_some());
                    if busy {
                        debug!(entry = %key, "transaction in flight, loaded copy not stored");
                    } else {
                        store.unpublished_mut().insert(entry.clone(), None);
                    }
                }
                self.inner
                    .events
                    .emit(WorkflowEvent::UnpublishedEntryLoaded { key });
                EntryLoadOutcome::Unpublished(entry)
            }
            Err(err) if err.redirects() => {
                debug!(entry = %key, "entry left the workflow, loading published copy");
                self.inner
                    .events
                    .emit(WorkflowEvent::UnpublishedEntryRedirected { key });
                self.load_entry(&collection.name, slug).await
            }
            Err(BackendError::NotUnderEditorialWorkflow { redirect: false }) => {
                let err = WorkflowError::NotUnderWorkflow {
                    collection: key.collection.clone(),
                    slug: key.slug.clone(),
                };
                warn!(entry = %key, "entry is not under review");
                self.notify_danger(MessageKey::OnFailToLoadEntries, Some(err.to_string()));
                EntryLoadOutcome::Failed(err)
            }
            Err(err) => {
                warn!(entry = %key, error = %err, "failed to load unpublished entry");
                self.notify_danger(MessageKey::OnFailToLoadEntries, Some(err.to_string()));
                EntryLoadOutcome::Failed(err.into())
            }
        }
    }

    /// Loads one published entry into the published store.
    pub async fn load_entry(&self, collection: &str, slug: &str) -> EntryLoadOutcome {
        let collection = match self.collection(collection) {
            Ok(collection) => collection,
            Err(err) => {
                self.notify_danger(MessageKey::OnFailToLoadEntry, Some(err.to_string()));
                return EntryLoadOutcome::Failed(err);
            }
        };

        match self.inner.backend.entry(&collection, slug).await {
            Ok(entry) => {
                let entry = self.decode(&collection, entry);
                let key = entry.key();
                self.inner.store.lock().published_mut().insert(entry.clone());
                self.inner.events.emit(WorkflowEvent::EntryLoaded { key });
                EntryLoadOutcome::Published(entry)
            }
            Err(err) => {
                warn!(collection = %collection.name, slug, error = %err, "failed to load entry");
                self.notify_danger(MessageKey::OnFailToLoadEntry, Some(err.to_string()));
                EntryLoadOutcome::Failed(WorkflowError::Backend(err))
            }
        }
    }
}

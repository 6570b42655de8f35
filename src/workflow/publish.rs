//! Publishing, unpublishing and deleting entries under review.

use super::{EditorialWorkflow, Settlement};
use crate::backend::{BackendError, PersistOptions, PersistRequest};
use crate::core::WorkflowStatus;
use crate::error::WorkflowError;
use crate::model::{Collection, EntryDraft, EntryKey};
use crate::notify::MessageKey;
use crate::transaction::{OptimisticUpdate, Resolution};
use tracing::{error, info, warn};

impl EditorialWorkflow {
    /// Publishes an unpublished entry.
    ///
    /// After the commit the published entry is loaded, the media files the
    /// backend returned become regular library files and the entry's draft
    /// media is dropped. None of this happens when the backend fails.
    pub async fn publish_unpublished_entry(&self, collection: &str, slug: &str) -> Settlement {
        let failure = MessageKey::OnFailToPublishEntry;
        let collection = match self.collection(collection) {
            Ok(collection) => collection,
            Err(err) => return self.abort(err, failure),
        };
        let key = EntryKey::new(collection.name.clone(), slug);

        let guard = self.inner.locks.acquire(&key).await;
        let tx = match self.begin(OptimisticUpdate::Publish { key: key.clone() }, failure) {
            Ok(tx) => tx,
            Err(settlement) => return settlement,
        };

        let response = match self
            .inner
            .backend
            .publish_unpublished_entry(&collection.name, slug)
            .await
        {
            Ok(response) => response,
            Err(err) => return self.fail(tx, err.into(), failure),
        };
        if let Err(err) = tx.commit(Resolution::Confirmed) {
            return self.abort(err.into(), failure);
        }
        drop(guard);

        info!(entry = %key, media = response.media_files.len(), "entry published");
        self.notify_success(MessageKey::EntryPublished);

        self.load_entry(&collection.name, slug).await;
        let mut store = self.inner.store.lock();
        store.media_mut().add_files(response.media_files, false);
        store.media_mut().clear_draft_entry_media(&key);
        Settlement::Committed
    }

    /// Moves a published entry back under review as `pending_publish`.
    ///
    /// The published entry is deleted first and then recreated. The two
    /// provider calls are not atomic: when the recreate fails after the
    /// delete succeeded, the process state reverts but the provider no
    /// longer has the entry in either form. `workflow.unpublish_policy`
    /// decides how often the recreate is attempted before giving up.
    pub async fn unpublish_published_entry(&self, collection: &str, slug: &str) -> Settlement {
        let failure = MessageKey::OnFailToUnpublishEntry;
        let collection = match self.collection(collection) {
            Ok(collection) => collection,
            Err(err) => return self.abort(err, failure),
        };
        let key = EntryKey::new(collection.name.clone(), slug);

        let guard = self.inner.locks.acquire(&key).await;
        let published = self.inner.store.lock().published().get(&key).cloned();
        let Some(entry) = published else {
            return self.abort(WorkflowError::EntryNotFound(key), failure);
        };
        let tx = match self.begin(OptimisticUpdate::Unpublish { entry: entry.clone() }, failure) {
            Ok(tx) => tx,
            Err(settlement) => return settlement,
        };

        if let Err(err) = self
            .inner
            .backend
            .delete_entry(&self.inner.config, &collection, slug)
            .await
        {
            return self.fail(tx, err.into(), failure);
        }

        let mut draft = EntryDraft::new(self.encode(&collection, entry));
        draft.entry.status = Some(WorkflowStatus::PendingPublish);
        let slug = match self.recreate(&collection, &draft).await {
            Ok(slug) => slug,
            Err(err) => {
                error!(
                    entry = %key,
                    error = %err,
                    "published entry deleted but not recreated, restore it at the provider by hand"
                );
                return self.fail(tx, WorkflowError::PartialUnpublish { source: err }, failure);
            }
        };

        let path = collection.entry_path(&slug);
        let key = match tx.commit(Resolution::Persisted { slug, path }) {
            Ok(key) => key,
            Err(err) => return self.abort(err.into(), failure),
        };
        drop(guard);

        info!(entry = %key, "entry unpublished");
        self.load_unpublished_entry(&key.collection, &key.slug).await;
        self.notify_success(MessageKey::EntryUnpublished);
        Settlement::Committed
    }

    /// Persists `draft` as a new entry, retrying as the unpublish policy allows.
    async fn recreate(
        &self,
        collection: &Collection,
        draft: &EntryDraft,
    ) -> Result<String, BackendError> {
        let attempts = self.inner.config.workflow.unpublish_policy.attempts();
        let mut attempt = 1;
        loop {
            let request = PersistRequest {
                config: &self.inner.config,
                collection,
                draft,
                assets: &[],
                integrations: &self.inner.config.integrations,
                used_slugs: &[],
                options: PersistOptions {
                    status: Some(WorkflowStatus::PendingPublish),
                },
            };
            match self.inner.backend.persist_entry(request).await {
                Ok(slug) => return Ok(slug),
                Err(err) if attempt < attempts => {
                    warn!(attempt, attempts, error = %err, "recreate failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Discards the pending changes of an unpublished entry.
    pub async fn delete_unpublished_entry(&self, collection: &str, slug: &str) -> Settlement {
        let message = MessageKey::OnDeleteUnpublishedChanges;
        let key = EntryKey::new(collection, slug);

        let _guard = self.inner.locks.acquire(&key).await;
        let tx = match self.begin(OptimisticUpdate::Delete { key: key.clone() }, message) {
            Ok(tx) => tx,
            Err(settlement) => return settlement,
        };

        match self
            .inner
            .backend
            .delete_unpublished_entry(collection, slug)
            .await
        {
            Ok(()) => match tx.commit(Resolution::Confirmed) {
                Ok(_) => {
                    info!(entry = %key, "unpublished changes deleted");
                    self.notify_success(message);
                    Settlement::Committed
                }
                Err(err) => self.abort(err.into(), message),
            },
            Err(err) => self.fail(tx, err.into(), message),
        }
    }
}

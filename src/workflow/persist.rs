//! Saving drafts of entries under review.

use super::EditorialWorkflow;
use crate::backend::{PersistOptions, PersistRequest};
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::{EntryDraft, FieldError};
use crate::notify::MessageKey;
use crate::transaction::{OptimisticUpdate, Resolution};
use stillwater::validation::Validation;
use tracing::{debug, info, warn};

impl EditorialWorkflow {
    /// Validates `draft` and writes it to the backend.
    ///
    /// `existing` selects between updating an entry already under review
    /// and creating a new one. Returns the slug the backend stored the entry
    /// under. This is the one operation whose failures reach the caller, so
    /// the editor can keep the draft open.
    pub async fn persist_unpublished_entry(
        &self,
        collection: &str,
        draft: &EntryDraft,
        existing: bool,
    ) -> WorkflowResult<String> {
        self.spawn_unpublished_load();
        let collection = self.collection(collection)?;

        if let Validation::Failure(errors) = self.inner.gate.check(&collection, draft) {
            let errors: Vec<FieldError> = errors.iter().cloned().collect();
            let missing_required = errors.iter().any(FieldError::is_presence);
            debug!(
                collection = %collection.name,
                errors = errors.len(),
                missing_required,
                "draft rejected by validation"
            );
            if missing_required {
                self.notify_danger(MessageKey::MissingRequiredField, None);
            }
            return Err(WorkflowError::Validation {
                errors,
                missing_required,
            });
        }

        let used_slugs = self.inner.store.lock().used_slugs(&collection.name);

        let entry_path = if draft.entry.path.is_empty() {
            collection.entry_path(&draft.entry.slug)
        } else {
            draft.entry.path.clone()
        };
        let assets = self
            .inner
            .assets
            .resolve(&collection, &entry_path, &draft.media_files);

        let mut stored = draft.clone();
        stored.entry = self.encode(&collection, stored.entry);
        let key = draft.entry.key();

        let _guard = self.inner.locks.acquire(&key).await;
        let tx = self.inner.transactions.begin(OptimisticUpdate::Persist {
            entry: draft.entry.clone(),
        })?;

        let request = PersistRequest {
            config: &self.inner.config,
            collection: &collection,
            draft: &stored,
            assets: &assets,
            integrations: &self.inner.config.integrations,
            used_slugs: &used_slugs,
            options: PersistOptions::default(),
        };
        let result = if existing {
            self.inner.backend.persist_unpublished_entry(request).await
        } else {
            self.inner.backend.persist_entry(request).await
        };

        match result {
            Ok(slug) => {
                let path = collection.entry_path(&slug);
                let key = tx.commit(Resolution::Persisted {
                    slug: slug.clone(),
                    path,
                })?;
                info!(entry = %key, "entry saved");
                self.notify_success(MessageKey::EntrySaved);
                Ok(slug)
            }
            Err(err) => {
                let id = tx.id();
                tx.revert()?;
                warn!(transaction = %id, entry = %key, error = %err, "persist failed, reverted");
                self.notify_danger(MessageKey::OnFailToPersist, Some(err.to_string()));
                Err(WorkflowError::Backend(err))
            }
        }
    }
}

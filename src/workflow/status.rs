//! Moving entries between review stages.

use super::{EditorialWorkflow, Settlement};
use crate::core::{State, WorkflowStatus};
use crate::model::EntryKey;
use crate::notify::MessageKey;
use crate::transaction::{OptimisticUpdate, Resolution};
use tracing::{debug, info};

impl EditorialWorkflow {
    /// Moves an unpublished entry from `old` to `new`.
    ///
    /// Identity transitions are skipped without a transaction or backend
    /// call. The entry keeps its collection and slug.
    pub async fn update_unpublished_entry_status(
        &self,
        collection: &str,
        slug: &str,
        old: WorkflowStatus,
        new: WorkflowStatus,
    ) -> Settlement {
        let key = EntryKey::new(collection, slug);
        if !self.inner.status_guard.check(&old, &new) {
            debug!(entry = %key, status = new.name(), "status unchanged, skipped");
            return Settlement::Skipped;
        }

        let _guard = self.inner.locks.acquire(&key).await;
        let update = OptimisticUpdate::StatusChange {
            key: key.clone(),
            from: old,
            to: new,
        };
        let tx = match self.begin(update, MessageKey::OnFailToUpdateStatus) {
            Ok(tx) => tx,
            Err(settlement) => return settlement,
        };

        match self
            .inner
            .backend
            .update_unpublished_entry_status(collection, slug, new)
            .await
        {
            Ok(()) => match tx.commit(Resolution::Confirmed) {
                Ok(_) => {
                    info!(entry = %key, from = old.name(), to = new.name(), "status updated");
                    self.notify_success(MessageKey::EntryUpdated);
                    Settlement::Committed
                }
                Err(err) => self.abort(err.into(), MessageKey::OnFailToUpdateStatus),
            },
            Err(err) => self.fail(tx, err.into(), MessageKey::OnFailToUpdateStatus),
        }
    }
}

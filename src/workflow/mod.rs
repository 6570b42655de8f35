//! The editorial workflow engine.
//!
//! Every mutating operation follows the same protocol: take the entry lock,
//! begin a transaction (the optimistic change is visible at once), await
//! the backend, then commit or revert and notify.
//!
//! ```no_run
//! use editorial::{EditorialWorkflow, WorkflowConfig, WorkflowStatus};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkflowConfig::from_path("editorial.toml")?;
//! let workflow = EditorialWorkflow::builder().config(config).build()?;
//!
//! workflow
//!     .update_unpublished_entry_status(
//!         "posts",
//!         "hello-world",
//!         WorkflowStatus::Draft,
//!         WorkflowStatus::PendingReview,
//!     )
//!     .await;
//! # Ok(())
//! # }
//! ```

mod loader;
mod outcome;
mod persist;
mod publish;
mod status;

pub use outcome::{EntryLoadOutcome, LoadOutcome, Settlement};

use crate::backend::BackendAdapter;
use crate::builder::EditorialWorkflowBuilder;
use crate::config::WorkflowConfig;
use crate::core::{Guard, WorkflowStatus};
use crate::error::WorkflowError;
use crate::events::{EventBus, WorkflowEvent};
use crate::media::AssetResolver;
use crate::model::{Collection, Entry, EntryKey};
use crate::notify::{DismissTimes, MessageKey, Notifier};
use crate::serialize::{deserialize_values, serialize_values, SerializerRegistry};
use crate::store::{LoadState, SharedStore, WorkflowStore};
use crate::transaction::{EntryLocks, OptimisticUpdate, Transaction, TransactionManager};
use crate::validation::ValidationGate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, warn};

/// Handle to the workflow engine. Clones share the same state.
#[derive(Clone)]
pub struct EditorialWorkflow {
    inner: Arc<Inner>,
}

struct Inner {
    config: WorkflowConfig,
    backend: Arc<dyn BackendAdapter>,
    store: SharedStore,
    transactions: TransactionManager,
    locks: EntryLocks,
    events: EventBus,
    notifier: Arc<dyn Notifier>,
    dismiss: DismissTimes,
    assets: Arc<dyn AssetResolver>,
    serializers: SerializerRegistry,
    gate: ValidationGate,
    status_guard: Guard<WorkflowStatus>,
}

impl EditorialWorkflow {
    pub fn builder() -> EditorialWorkflowBuilder {
        EditorialWorkflowBuilder::new()
    }

    pub(crate) fn assemble(
        config: WorkflowConfig,
        backend: Arc<dyn BackendAdapter>,
        notifier: Arc<dyn Notifier>,
        assets: Arc<dyn AssetResolver>,
        serializers: SerializerRegistry,
        gate: ValidationGate,
    ) -> Self {
        let store = WorkflowStore::shared();
        let events = EventBus::new();
        let transactions = TransactionManager::new(Arc::clone(&store), events.clone());
        let locks = EntryLocks::new(config.workflow.serialize_entry_transactions);
        let dismiss = config.notifications.dismiss_times();

        Self {
            inner: Arc::new(Inner {
                config,
                backend,
                store,
                transactions,
                locks,
                events,
                notifier,
                dismiss,
                assets,
                serializers,
                gate,
                status_guard: Guard::distinct(),
            }),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> Arc<dyn BackendAdapter> {
        Arc::clone(&self.inner.backend)
    }

    /// Receives every store change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.inner.events.subscribe()
    }

    /// Runs `f` against the current store state.
    pub fn read<R>(&self, f: impl FnOnce(&WorkflowStore) -> R) -> R {
        f(&self.inner.store.lock())
    }

    /// Copy of the current store state.
    pub fn snapshot(&self) -> WorkflowStore {
        self.inner.store.lock().clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.store.lock().unpublished().load_state()
    }

    pub fn unpublished_entry(&self, collection: &str, slug: &str) -> Option<Entry> {
        self.inner
            .store
            .lock()
            .unpublished()
            .entry(&EntryKey::new(collection, slug))
            .cloned()
    }

    pub fn published_entry(&self, collection: &str, slug: &str) -> Option<Entry> {
        self.inner
            .store
            .lock()
            .published()
            .get(&EntryKey::new(collection, slug))
            .cloned()
    }

    fn collection(&self, name: &str) -> Result<Collection, WorkflowError> {
        self.inner
            .config
            .collection(name)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownCollection(name.to_string()))
    }

    /// `entry` with its values in stored form.
    fn encode(&self, collection: &Collection, mut entry: Entry) -> Entry {
        entry.data = serialize_values(&entry.data, &collection.fields, &self.inner.serializers);
        entry
    }

    /// `entry` with its values in in-memory form.
    fn decode(&self, collection: &Collection, mut entry: Entry) -> Entry {
        entry.data = deserialize_values(&entry.data, &collection.fields, &self.inner.serializers);
        entry
    }

    fn notify_success(&self, key: MessageKey) {
        self.inner.notifier.notify(self.inner.dismiss.success(key));
    }

    fn notify_danger(&self, key: MessageKey, details: Option<String>) {
        self.inner
            .notifier
            .notify(self.inner.dismiss.danger(key, details));
    }

    /// Begins `update`, or reports why it could not begin.
    fn begin(
        &self,
        update: OptimisticUpdate,
        failure: MessageKey,
    ) -> Result<Transaction, Settlement> {
        self.inner
            .transactions
            .begin(update)
            .map_err(|err| self.abort(err.into(), failure))
    }

    /// Reports an operation that stopped before its transaction began.
    fn abort(&self, err: WorkflowError, failure: MessageKey) -> Settlement {
        warn!(error = %err, "operation aborted");
        self.notify_danger(failure, Some(err.to_string()));
        Settlement::Aborted(err)
    }

    /// Reverts `tx` after its backend call failed with `err`.
    fn fail(&self, tx: Transaction, err: WorkflowError, failure: MessageKey) -> Settlement {
        let id = tx.id();
        let key = tx.key().clone();
        if let Err(revert_err) = tx.revert() {
            error!(transaction = %id, entry = %key, error = %revert_err, "revert failed");
        }
        warn!(transaction = %id, entry = %key, error = %err, "backend call failed, reverted");
        self.notify_danger(failure, Some(err.to_string()));
        Settlement::Reverted(err)
    }
}

impl fmt::Debug for EditorialWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorialWorkflow")
            .field("backend", &self.inner.backend.name())
            .field("publish_mode", &self.inner.config.publish_mode)
            .field("load_state", &self.load_state())
            .finish_non_exhaustive()
    }
}

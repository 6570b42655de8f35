//! Editorial: an editorial workflow engine for content backends
//!
//! Entries move through review stages (draft, pending review, pending
//! publish, published) while the in-process state stays consistent with an
//! asynchronous backend that may fail at any call.
//!
//! # Core Concepts
//!
//! - **Transactions**: every mutation is applied optimistically, then
//!   committed with the backend's answer or reverted to its snapshot
//! - **Backends**: providers implement [`BackendAdapter`] and are chosen
//!   once from configuration
//! - **Validation gate**: drafts with field errors never reach the backend
//! - **Events**: observers subscribe to typed store changes
//!
//! # Example
//!
//! ```rust
//! use editorial::backend::InMemoryBackend;
//! use editorial::model::{Collection, Entry};
//! use editorial::{EditorialWorkflow, Settlement, WorkflowConfig, WorkflowStatus};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = Arc::new(InMemoryBackend::new().with_unpublished(
//!     Entry::new("posts", "hello-world").with_status(WorkflowStatus::Draft),
//! ));
//! let config = WorkflowConfig::new("test-repo").with_collection(Collection::new("posts"));
//! let workflow = EditorialWorkflow::builder()
//!     .config(config)
//!     .backend(backend)
//!     .build()
//!     .unwrap();
//!
//! workflow
//!     .load_unpublished_entries(&workflow.config().collections)
//!     .await;
//! let settlement = workflow
//!     .update_unpublished_entry_status(
//!         "posts",
//!         "hello-world",
//!         WorkflowStatus::Draft,
//!         WorkflowStatus::PendingReview,
//!     )
//!     .await;
//!
//! assert_eq!(settlement, Settlement::Committed);
//! assert_eq!(
//!     workflow
//!         .unpublished_entry("posts", "hello-world")
//!         .and_then(|entry| entry.status),
//!     Some(WorkflowStatus::PendingReview)
//! );
//! # }
//! ```

pub mod backend;
pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod logging;
pub mod media;
pub mod model;
pub mod notify;
pub mod serialize;
pub mod store;
pub mod transaction;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use backend::{BackendAdapter, BackendError};
pub use builder::{BuildError, EditorialWorkflowBuilder};
pub use config::{ConfigError, PublishMode, UnpublishPolicy, WorkflowConfig};
pub use core::{Guard, State, StateHistory, StateTransition, WorkflowStatus};
pub use error::{WorkflowError, WorkflowResult};
pub use events::WorkflowEvent;
pub use workflow::{EditorialWorkflow, EntryLoadOutcome, LoadOutcome, Settlement};

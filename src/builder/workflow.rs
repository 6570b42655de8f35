//! Builder for constructing the workflow engine.

use crate::backend::{BackendAdapter, BackendRegistry};
use crate::builder::error::BuildError;
use crate::config::WorkflowConfig;
use crate::media::{AssetResolver, LocalAssetResolver};
use crate::notify::{Notifier, TracingNotifier};
use crate::serialize::SerializerRegistry;
use crate::validation::ValidationGate;
use crate::workflow::EditorialWorkflow;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builder for [`EditorialWorkflow`] with a fluent API.
///
/// Only the configuration is required. The backend is resolved from
/// `backend.name` through the registry unless one is supplied directly.
pub struct EditorialWorkflowBuilder {
    config: Option<WorkflowConfig>,
    registry: BackendRegistry,
    backend: Option<Arc<dyn BackendAdapter>>,
    notifier: Option<Arc<dyn Notifier>>,
    assets: Option<Arc<dyn AssetResolver>>,
    serializers: Option<SerializerRegistry>,
    gate: Option<ValidationGate>,
}

impl EditorialWorkflowBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            registry: BackendRegistry::with_defaults(),
            backend: None,
            notifier: None,
            assets: None,
            serializers: None,
            gate: None,
        }
    }

    /// Set the configuration (required).
    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the provider registry used to resolve `backend.name`.
    pub fn registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use `backend` instead of resolving one from the registry.
    pub fn backend(mut self, backend: Arc<dyn BackendAdapter>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn asset_resolver(mut self, assets: Arc<dyn AssetResolver>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn serializers(mut self, serializers: SerializerRegistry) -> Self {
        self.serializers = Some(serializers);
        self
    }

    pub fn validation_gate(mut self, gate: ValidationGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Build the workflow.
    /// Returns an error if the configuration is missing or invalid.
    pub fn build(self) -> Result<EditorialWorkflow, BuildError> {
        let config = self.config.ok_or(BuildError::MissingConfig)?;
        config.validate()?;

        let backend = match self.backend {
            Some(backend) => {
                if backend.name() != config.backend.name {
                    warn!(
                        configured = %config.backend.name,
                        supplied = backend.name(),
                        "supplied backend differs from configuration"
                    );
                }
                backend
            }
            None => self.registry.resolve(&config)?,
        };
        debug!(backend = backend.name(), mode = ?config.publish_mode, "building workflow");

        Ok(EditorialWorkflow::assemble(
            config,
            backend,
            self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            self.assets.unwrap_or_else(|| Arc::new(LocalAssetResolver)),
            self.serializers.unwrap_or_else(SerializerRegistry::with_defaults),
            self.gate.unwrap_or_default(),
        ))
    }
}

impl Default for EditorialWorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

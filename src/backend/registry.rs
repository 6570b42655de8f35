//! Provider selection by configured name.

use super::{BackendAdapter, InMemoryBackend};
use crate::config::{ConfigError, WorkflowConfig};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Builds a provider from configuration.
pub type BackendFactory =
    Arc<dyn Fn(&WorkflowConfig) -> Arc<dyn BackendAdapter> + Send + Sync>;

/// Provider factories by name.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(InMemoryBackend::NAME, |_| -> Arc<dyn BackendAdapter> {
            Arc::new(InMemoryBackend::new())
        });
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&WorkflowConfig) -> Arc<dyn BackendAdapter> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Registers a ready-made provider instance under its own name.
    pub fn register_instance(&mut self, backend: Arc<dyn BackendAdapter>) {
        let name = backend.name().to_string();
        self.register(name, move |_| Arc::clone(&backend));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds the provider named by `backend.name`.
    pub fn resolve(&self, config: &WorkflowConfig) -> Result<Arc<dyn BackendAdapter>, ConfigError> {
        let name = &config.backend.name;
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownBackend(name.clone()))?;
        info!(backend = %name, "backend selected");
        Ok(factory(config))
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("BackendRegistry").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_provider() {
        let registry = BackendRegistry::with_defaults();
        let backend = registry
            .resolve(&WorkflowConfig::new(InMemoryBackend::NAME))
            .unwrap();
        assert_eq!(backend.name(), "test-repo");
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let registry = BackendRegistry::with_defaults();
        let err = registry.resolve(&WorkflowConfig::new("github")).err().expect("expected an error");
        assert!(matches!(err, ConfigError::UnknownBackend(name) if name == "github"));
    }

    #[test]
    fn registered_instances_are_shared() {
        let shared: Arc<dyn BackendAdapter> = Arc::new(InMemoryBackend::new());
        let mut registry = BackendRegistry::new();
        registry.register_instance(Arc::clone(&shared));

        let resolved = registry
            .resolve(&WorkflowConfig::new(InMemoryBackend::NAME))
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &shared));
    }
}

//! Workflow configuration.
//!
//! Read once at startup, usually from a TOML file:
//!
//! ```toml
//! publish_mode = "editorial_workflow"
//!
//! [backend]
//! name = "test-repo"
//!
//! [workflow]
//! unpublish_policy = { retry = 2 }
//!
//! [[collections]]
//! name = "posts"
//! folder = "content/posts"
//!
//! [[collections.fields]]
//! name = "title"
//! ```

use crate::model::Collection;
use crate::notify::DismissTimes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no backend named '{0}' is registered")]
    UnknownBackend(String),
}

/// How entries reach the published site.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// Saving an entry publishes it.
    #[default]
    Simple,
    /// Entries go through draft, review and publish stages.
    EditorialWorkflow,
}

/// What to do when unpublishing deleted the published entry but could not
/// recreate it as an unpublished one.
///
/// The provider-side delete cannot be undone from here. Either way the
/// transaction reverts and the failure is reported; the entry then exists
/// neither published nor unpublished at the provider until it is restored
/// by hand.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpublishPolicy {
    /// Attempt the recreate step once.
    #[default]
    BestEffort,
    /// Retry the recreate step up to this many extra times.
    Retry(u32),
}

impl UnpublishPolicy {
    /// Total number of recreate attempts.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::BestEffort => 1,
            Self::Retry(extra) => extra.saturating_add(1),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registered provider name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Serialize transactions touching the same entry.
    #[serde(default = "default_true")]
    pub serialize_entry_transactions: bool,
    #[serde(default)]
    pub unpublish_policy: UnpublishPolicy,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            serialize_entry_transactions: true,
            unpublish_policy: UnpublishPolicy::default(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "NotificationSettings::default_success_ms")]
    pub success_dismiss_ms: u64,
    #[serde(default = "NotificationSettings::default_danger_ms")]
    pub danger_dismiss_ms: u64,
}

impl NotificationSettings {
    fn default_success_ms() -> u64 {
        4000
    }

    fn default_danger_ms() -> u64 {
        8000
    }

    pub fn dismiss_times(&self) -> DismissTimes {
        DismissTimes {
            success: Duration::from_millis(self.success_dismiss_ms),
            danger: Duration::from_millis(self.danger_dismiss_ms),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            success_dismiss_ms: Self::default_success_ms(),
            danger_dismiss_ms: Self::default_danger_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level directive.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// Per-target level directives.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            filters: BTreeMap::new(),
        }
    }
}

/// A third-party integration the backend forwards persists to.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Integration {
    pub provider: String,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<String>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub publish_mode: PublishMode,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub integrations: Vec<Integration>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl WorkflowConfig {
    /// Creates an editorial-workflow configuration for `backend`.
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig {
                name: backend.into(),
                repo: None,
                branch: default_branch(),
            },
            publish_mode: PublishMode::EditorialWorkflow,
            workflow: WorkflowSettings::default(),
            notifications: NotificationSettings::default(),
            logging: LoggingConfig::default(),
            integrations: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Validate configuration correctness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.name.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.name must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for collection in &self.collections {
            if collection.name.trim().is_empty() {
                return Err(ConfigError::Invalid("collection name must not be empty".into()));
            }
            if !seen.insert(collection.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate collection '{}'",
                    collection.name
                )));
            }
        }

        Ok(())
    }

    pub fn with_publish_mode(mut self, mode: PublishMode) -> Self {
        self.publish_mode = mode;
        self
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn with_unpublish_policy(mut self, policy: UnpublishPolicy) -> Self {
        self.workflow.unpublish_policy = policy;
        self
    }

    pub fn with_entry_serialization(mut self, enabled: bool) -> Self {
        self.workflow.serialize_entry_transactions = enabled;
        self
    }

    pub fn is_editorial_workflow(&self) -> bool {
        self.publish_mode == PublishMode::EditorialWorkflow
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

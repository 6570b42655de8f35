//! Build errors for the workflow builder.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur when building a workflow.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration not specified. Call .config(config) before .build()")]
    MissingConfig,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

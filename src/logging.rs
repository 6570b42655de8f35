//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Filter directives for `config`, e.g. `info,editorial::backend=trace`.
pub fn directives(config: &LoggingConfig) -> String {
    let mut directives = vec![config.level.clone()];
    directives.extend(
        config
            .filters
            .iter()
            .map(|(target, level)| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured directives. Returns
/// `false` when a global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(config)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

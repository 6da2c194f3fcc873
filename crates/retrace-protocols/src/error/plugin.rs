//! Plugin lifecycle errors.

use thiserror::Error;

/// Failure in a plugin lifecycle hook.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("activation failed: {0}")]
    ActivationFailed(String),

    #[error("teardown failed: {0}")]
    TeardownFailed(String),
}

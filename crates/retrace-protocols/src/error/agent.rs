//! Top-level agent error type.

use thiserror::Error;

use super::{BatchError, PluginError, UploadError};

/// Top-level error surfaced to the embedding host.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Another agent is already active on this page. Reported once as an
    /// `AgentDuplicated` instrumentation event; the second instance refuses
    /// to start.
    #[error("an agent is already active on this page")]
    AlreadyActive,

    #[error("session is not active")]
    NotActive,

    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_error_converts() {
        let err = AgentError::from(PluginError::ActivationFailed("x".to_string()));
        assert!(err.to_string().contains("plugin error"));
    }

    #[test]
    fn upload_error_converts() {
        let err = AgentError::from(UploadError::Status(404));
        assert!(err.to_string().contains("upload error"));
    }
}

//! Configuration schema.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Agent configuration, snapshotted at activation. Runtime mutation is not
/// supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum contiguous milliseconds the backfill loop may hold the
    /// thread per pump slice.
    pub time_to_yield_ms: u64,

    /// Maximum serialized payload size in bytes per batch.
    pub batch_limit_bytes: usize,

    /// Run shadow-vs-live checks and emit diagnostics.
    pub validate_consistency: bool,

    /// Collector endpoint. When unset, the host drains batches itself.
    pub upload_url: Option<String>,

    /// Attribute names whose values are masked in layout snapshots.
    pub sensitive_attributes: Vec<String>,

    /// Capture text content. When false, text is replaced with a
    /// same-length wash.
    pub show_text: bool,

    /// Capture image sources. When false, `src` is dropped from images.
    pub show_images: bool,

    /// Minimum Euclidean scroll distance, in pixels, between two emitted
    /// scroll states for the same element.
    pub scroll_threshold_px: f64,

    /// Minimum pointer travel, in pixels, between two emitted move states.
    pub pointer_sample_px: f64,

    pub log: LogConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            time_to_yield_ms: 30,
            batch_limit_bytes: 100 * 1024,
            validate_consistency: true,
            upload_url: None,
            sensitive_attributes: vec!["value".to_string(), "placeholder".to_string()],
            show_text: true,
            show_images: true,
            scroll_threshold_px: 5.0,
            pointer_sample_px: 8.0,
            log: LogConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_to_yield_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "time_to_yield_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.batch_limit_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch_limit_bytes",
                reason: "must be positive".to_string(),
            });
        }
        if self.scroll_threshold_px < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scroll_threshold_px",
                reason: "must not be negative".to_string(),
            });
        }
        if let Some(url) = &self.upload_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: "upload_url",
                    reason: format!("not an http(s) url: {url}"),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Tracing filter directive, e.g. `info` or `retrace=debug`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

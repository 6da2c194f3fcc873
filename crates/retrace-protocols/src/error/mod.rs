//! Error types shared across the engine.
//!
//! These cover host-facing API misuse and background I/O only; anomalies the
//! engine can absorb are reported as instrumentation events instead.

mod agent;
mod batch;
mod plugin;
mod upload;

pub use agent::AgentError;
pub use batch::BatchError;
pub use plugin::PluginError;
pub use upload::UploadError;

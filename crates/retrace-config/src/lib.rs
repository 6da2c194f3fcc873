//! # Retrace Config
//!
//! Configuration management for the retrace agent.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{AgentConfig, LogConfig};

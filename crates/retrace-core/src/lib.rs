//! # Retrace Core
//!
//! Lifecycle and plugin host for the retrace agent.
//!
//! ## Components
//!
//! - [`Plugin`] - the capability set every plugin satisfies
//! - [`Session`] - one impression: activation, the pump loop, teardown
//! - [`Collector`] / [`HttpCollector`] - the upload seam
//!
//! The host guarantees plugins are reset before activation, torn down
//! exactly once per activation, and handed a config snapshot that never
//! mutates underneath them.

pub mod plugin;
pub mod session;
pub mod upload;

pub use plugin::{Plugin, PluginContext};
pub use session::{Session, SessionState};
pub use upload::{Collector, HttpCollector};

//! # Retrace Plugins
//!
//! The supplemental capture plugins: pointer interactions, viewport
//! state, performance timings, and uncaught page errors. Each is a small
//! [`Plugin`](retrace_core::Plugin) that binds the listeners it needs at
//! activation and turns page events into typed state records.

mod jserror;
mod performance;
mod pointer;
mod viewport;

#[cfg(test)]
pub(crate) mod testutil;

pub use jserror::JsErrorPlugin;
pub use performance::PerformancePlugin;
pub use pointer::PointerPlugin;
pub use viewport::ViewportPlugin;

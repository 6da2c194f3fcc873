//! The plugin capability set.

use std::sync::Arc;

use retrace_config::AgentConfig;
use retrace_dom::{DomEvent, PageHandle};
use retrace_pipeline::EventPipeline;
use retrace_protocols::{EventOrigin, PluginError};

/// Everything a plugin may touch, snapshotted at activation.
#[derive(Clone)]
pub struct PluginContext {
    pub page: PageHandle,
    pub pipeline: Arc<EventPipeline>,
    pub config: Arc<AgentConfig>,
}

/// Capability set for plugins.
///
/// The host calls `reset` first, then `activate`, and guarantees
/// `teardown` runs exactly once per activation. Between those, the pump
/// loop drives `tick` every slice and routes page events to
/// `on_dom_event` for listeners the plugin bound.
pub trait Plugin: Send {
    /// Stable identity; listener bindings are routed back by this name.
    fn name(&self) -> &'static str;

    /// Origin stamped on events this plugin emits.
    fn origin(&self) -> EventOrigin;

    /// Clear per-session state. Always called before `activate`.
    fn reset(&mut self);

    fn activate(&mut self, ctx: &PluginContext) -> Result<(), PluginError>;

    fn teardown(&mut self, ctx: &PluginContext) -> Result<(), PluginError>;

    /// One cooperative slice of background work.
    fn tick(&mut self, _ctx: &PluginContext) {}

    /// A page event arrived for a listener this plugin bound.
    fn on_dom_event(&mut self, _ctx: &PluginContext, _event: &DomEvent) {}
}

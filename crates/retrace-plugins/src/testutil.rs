//! Shared scaffolding for plugin tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use retrace_config::AgentConfig;
use retrace_core::{Plugin, PluginContext};
use retrace_dom::{Document, PageHandle};
use retrace_pipeline::{EventPipeline, SessionClock};
use retrace_protocols::{AgentEvent, BatcherMessage};

pub(crate) fn harness(
    doc: Document,
    config: AgentConfig,
) -> (PluginContext, mpsc::UnboundedReceiver<BatcherMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = PluginContext {
        page: PageHandle::new(doc),
        pipeline: Arc::new(EventPipeline::new(SessionClock::start(), tx)),
        config: Arc::new(config),
    };
    (ctx, rx)
}

pub(crate) fn drain_events(rx: &mut mpsc::UnboundedReceiver<BatcherMessage>) -> Vec<AgentEvent> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let BatcherMessage::AddEvent { event, .. } = message {
            out.push(event);
        }
    }
    out
}

/// Deliver queued page events to one plugin, honoring its bindings.
pub(crate) fn route(plugin: &mut dyn Plugin, ctx: &PluginContext) {
    let events = ctx.page.lock().drain_events();
    for event in events {
        let owners = ctx.page.lock().owners_for(event.target, event.kind);
        if owners.iter().any(|owner| owner == plugin.name()) {
            plugin.on_dom_event(ctx, &event);
        }
    }
}

//! Shared scaffolding for tracker tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use retrace_config::AgentConfig;
use retrace_core::PluginContext;
use retrace_dom::{Document, NodeId, PageHandle};
use retrace_pipeline::{EventPipeline, SessionClock};
use retrace_protocols::{AgentEvent, BatcherMessage, EventData, LayoutState};

/// A plugin context wired to a capture channel instead of a batcher.
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

/// `<body><div id="a"></div></body>` under the document root.
pub(crate) fn simple_doc() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new("https://example.test/");
    let root = doc.root();
    let body = doc.create_element("body");
    let div = doc.create_element("div");
    doc.set_attribute(div, "id", "a");
    doc.append_child(root, body);
    doc.append_child(body, div);
    (doc, body, div)
}

/// Drain every event forwarded to the batcher so far.
pub(crate) fn drain_events(rx: &mut mpsc::UnboundedReceiver<BatcherMessage>) -> Vec<AgentEvent> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let BatcherMessage::AddEvent { event, .. } = message {
            out.push(event);
        }
    }
    out
}

pub(crate) fn layout_states(events: &[AgentEvent]) -> Vec<LayoutState> {
    events
        .iter()
        .filter_map(|event| match &event.data {
            EventData::Layout(state) => Some(state.clone()),
            _ => None,
        })
        .collect()
}

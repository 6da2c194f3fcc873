//! Uncaught page errors, reported verbatim.

use retrace_core::{Plugin, PluginContext};
use retrace_dom::{DomEvent, DomEventKind, EventDetail};
use retrace_protocols::{EventOrigin, Instrumentation, PluginError};

/// Forwards the page's `error` events as `JsError` instrumentation.
#[derive(Default)]
pub struct JsErrorPlugin;

impl JsErrorPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for JsErrorPlugin {
    fn name(&self) -> &'static str {
        "js_error"
    }

    fn origin(&self) -> EventOrigin {
        EventOrigin::Instrumentation
    }

    fn reset(&mut self) {}

    fn activate(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        let root = ctx.page.lock().root();
        ctx.pipeline
            .bind(&ctx.page, root, DomEventKind::Error, self.name());
        Ok(())
    }

    fn teardown(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }

    fn on_dom_event(&mut self, ctx: &PluginContext, event: &DomEvent) {
        if event.kind != DomEventKind::Error {
            return;
        }
        if let EventDetail::Error(detail) = &event.detail {
            ctx.pipeline.instrument(Instrumentation::JsError {
                message: detail.message.clone(),
                source: detail.source.clone(),
                line: detail.line,
                column: detail.column,
            });
        }
    }
}

#[cfg(test)]
#[path = "jserror_tests.rs"]
mod tests;

//! Viewport state capture.

use retrace_core::{Plugin, PluginContext};
use retrace_dom::{DomEvent, DomEventKind};
use retrace_protocols::{EventData, EventOrigin, PartialEvent, ViewportState};

/// Captures viewport resizes, document scrolls, and visibility flips.
/// Emits the initial viewport at activation so a replay always has a
/// starting frame.
#[derive(Default)]
pub struct ViewportPlugin;

impl ViewportPlugin {
    pub fn new() -> Self {
        Self
    }

    fn emit(&self, ctx: &PluginContext, state: ViewportState) {
        ctx.pipeline
            .add_event(self.origin(), PartialEvent::new(EventData::Viewport(state)));
    }

    fn current_resize(&self, ctx: &PluginContext) -> ViewportState {
        let doc = ctx.page.lock();
        let viewport = doc.viewport();
        ViewportState::Resize {
            width: viewport.width,
            height: viewport.height,
            device_pixel_ratio: viewport.device_pixel_ratio,
        }
    }
}

impl Plugin for ViewportPlugin {
    fn name(&self) -> &'static str {
        "viewport"
    }

    fn origin(&self) -> EventOrigin {
        EventOrigin::Viewport
    }

    fn reset(&mut self) {}

    fn activate(&mut self, ctx: &PluginContext) -> Result<(), retrace_protocols::PluginError> {
        let root = ctx.page.lock().root();
        for kind in [
            DomEventKind::Resize,
            DomEventKind::Scroll,
            DomEventKind::VisibilityChange,
        ] {
            ctx.pipeline.bind(&ctx.page, root, kind, self.name());
        }
        let initial = self.current_resize(ctx);
        self.emit(ctx, initial);
        Ok(())
    }

    fn teardown(&mut self, _ctx: &PluginContext) -> Result<(), retrace_protocols::PluginError> {
        Ok(())
    }

    fn on_dom_event(&mut self, ctx: &PluginContext, event: &DomEvent) {
        match event.kind {
            DomEventKind::Resize => {
                let state = self.current_resize(ctx);
                self.emit(ctx, state);
            }
            DomEventKind::Scroll => {
                let offsets = ctx.page.lock().viewport_scroll();
                self.emit(
                    ctx,
                    ViewportState::Scroll {
                        x: offsets.x,
                        y: offsets.y,
                    },
                );
            }
            DomEventKind::VisibilityChange => {
                let visible = ctx.page.lock().is_visible();
                self.emit(ctx, ViewportState::Visibility { visible });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;

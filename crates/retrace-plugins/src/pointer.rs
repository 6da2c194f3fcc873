//! Pointer interaction capture.

use retrace_core::{Plugin, PluginContext};
use retrace_dom::{DomEvent, DomEventKind, EventDetail};
use retrace_protocols::{
    EventData, EventOrigin, PartialEvent, PointerKind, PointerState,
};

/// Captures pointer moves, presses, and clicks.
///
/// Moves are distance-sampled so a steady drag does not flood the
/// pipeline; presses and clicks always ship.
pub struct PointerPlugin {
    last_move: Option<(f64, f64)>,
}

impl PointerPlugin {
    pub fn new() -> Self {
        Self { last_move: None }
    }
}

impl Default for PointerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PointerPlugin {
    fn name(&self) -> &'static str {
        "pointer"
    }

    fn origin(&self) -> EventOrigin {
        EventOrigin::Pointer
    }

    fn reset(&mut self) {
        self.last_move = None;
    }

    fn activate(&mut self, ctx: &PluginContext) -> Result<(), retrace_protocols::PluginError> {
        let root = ctx.page.lock().root();
        for kind in [
            DomEventKind::PointerMove,
            DomEventKind::PointerDown,
            DomEventKind::PointerUp,
            DomEventKind::Click,
        ] {
            ctx.pipeline.bind(&ctx.page, root, kind, self.name());
        }
        Ok(())
    }

    fn teardown(&mut self, _ctx: &PluginContext) -> Result<(), retrace_protocols::PluginError> {
        Ok(())
    }

    fn on_dom_event(&mut self, ctx: &PluginContext, event: &DomEvent) {
        let EventDetail::Pointer(detail) = &event.detail else {
            return;
        };
        let kind = match event.kind {
            DomEventKind::PointerMove => PointerKind::Move,
            DomEventKind::PointerDown => PointerKind::Down,
            DomEventKind::PointerUp => PointerKind::Up,
            DomEventKind::Click => PointerKind::Click,
            _ => return,
        };

        if kind == PointerKind::Move {
            let sample = ctx.config.pointer_sample_px;
            if let Some((x, y)) = self.last_move {
                let (dx, dy) = (detail.x - x, detail.y - y);
                if dx * dx + dy * dy < sample * sample {
                    return;
                }
            }
            self.last_move = Some((detail.x, detail.y));
        }

        ctx.pipeline.add_event(
            self.origin(),
            PartialEvent::new(EventData::Pointer(PointerState {
                kind,
                x: detail.x,
                y: detail.y,
                buttons: detail.buttons,
            })),
        );
    }
}

#[cfg(test)]
#[path = "pointer_tests.rs"]
mod tests;

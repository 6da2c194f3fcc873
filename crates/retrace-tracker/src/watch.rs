//! Watch bindings: scroll and input follow-up on tracked elements.

use tracing::debug;

use retrace_core::PluginContext;
use retrace_dom::{DomEventKind, NodeId};
use retrace_protocols::{
    EventData, EventOrigin, LayoutAction, LayoutData, LayoutSource, LayoutState, PartialEvent,
    ScrollPosition,
};

use crate::tracker::LayoutTracker;

impl LayoutTracker {
    /// Evaluate watch flags for indices that just produced an Insert or
    /// Update state. Listeners register at most once per index; a node
    /// that becomes scrollable later without producing an Update is not
    /// watched until its next update.
    pub(crate) fn register_watches(&mut self, ctx: &PluginContext, indices: &[i64]) {
        for &index in indices {
            if self.watched.contains(&index) {
                continue;
            }
            let Some(mirror) = self.mirror.as_ref() else {
                return;
            };
            let Some(node) = mirror.node_of(index) else {
                continue;
            };
            let (scroll, tag) = match self.last_states.get(&index) {
                Some(state) => (state.layout.scroll(), state.tag.clone()),
                None => continue,
            };

            let mut bound = false;
            if let Some(scroll) = scroll {
                ctx.pipeline
                    .bind(&ctx.page, node, DomEventKind::Scroll, "layout");
                self.last_scroll.insert(index, scroll);
                bound = true;
            }
            match tag.as_str() {
                "input" | "select" => {
                    ctx.pipeline
                        .bind(&ctx.page, node, DomEventKind::Change, "layout");
                    bound = true;
                }
                "textarea" => {
                    ctx.pipeline
                        .bind(&ctx.page, node, DomEventKind::Input, "layout");
                    bound = true;
                }
                _ => {}
            }
            if bound {
                debug!(index, tag = %tag, "watching element");
                self.watched.insert(index);
            }
        }
    }

    /// A watched element scrolled. Throttled by Euclidean distance from
    /// the last emitted offsets: small jitters never reach the pipeline.
    pub(crate) fn on_scroll(&mut self, ctx: &PluginContext, target: NodeId) {
        let Some(index) = self.mirror.as_ref().and_then(|m| m.index_of(target)) else {
            return;
        };
        let Some(current) = ctx.page.lock().get(target).and_then(|n| n.scroll()) else {
            return;
        };
        let baseline = self
            .last_scroll
            .get(&index)
            .copied()
            .unwrap_or(ScrollPosition { x: 0.0, y: 0.0 });
        let (dx, dy) = (current.x - baseline.x, current.y - baseline.y);
        let threshold = ctx.config.scroll_threshold_px;
        if dx * dx + dy * dy <= threshold * threshold {
            return;
        }

        let Some(last) = self.last_states.get(&index) else {
            return;
        };
        let mut state = last.derive(LayoutSource::Scroll, LayoutAction::Update);
        if let LayoutData::Box { scroll, .. } = &mut state.layout {
            *scroll = Some(ScrollPosition {
                x: current.x,
                y: current.y,
            });
        }
        self.last_scroll.insert(
            index,
            ScrollPosition {
                x: current.x,
                y: current.y,
            },
        );
        self.commit_follow_up(ctx, index, state);
    }

    /// A watched form control changed; capture the fresh value.
    pub(crate) fn on_input(&mut self, ctx: &PluginContext, target: NodeId) {
        let Some(index) = self.mirror.as_ref().and_then(|m| m.index_of(target)) else {
            return;
        };
        let value = match ctx.page.lock().get(target).and_then(|n| n.value().map(String::from)) {
            Some(value) => value,
            None => return,
        };
        let Some(last) = self.last_states.get(&index) else {
            return;
        };
        let mut state = last.derive(LayoutSource::Input, LayoutAction::Update);
        state
            .attributes
            .insert("value".to_string(), self.policy.mask_value("value", &value));
        self.commit_follow_up(ctx, index, state);
    }

    fn commit_follow_up(&mut self, ctx: &PluginContext, index: i64, state: LayoutState) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.set_snapshot(index, state.clone());
        }
        self.last_states.insert(index, state.clone());
        ctx.pipeline
            .add_event(EventOrigin::Layout, PartialEvent::new(EventData::Layout(state)));
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;

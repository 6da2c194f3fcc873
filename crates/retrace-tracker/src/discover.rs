//! Discovery and time-sliced backfill.

use tracing::{debug, info};

use retrace_core::PluginContext;
use retrace_mirror::ShadowMirror;
use retrace_protocols::{
    EventData, EventOrigin, Instrumentation, LayoutAction, LayoutSource, PartialEvent,
    RoutineDescriptor,
};

use crate::snapshot;
use crate::tracker::{BackfillEntry, LayoutTracker};

impl LayoutTracker {
    /// Initial discovery: traverse the live document depth-first, insert
    /// every node into the shadow with a placeholder layout, register the
    /// mutation observer, and run the immediate consistency check. Full
    /// layouts arrive later through backfill slices.
    pub(crate) fn discover(&mut self, ctx: &PluginContext) {
        let report = {
            let mut doc = ctx.page.lock();
            let mut mirror = ShadowMirror::new(doc.root());
            let time = ctx.pipeline.timestamp(false);

            for node in doc.descendants(doc.root()) {
                if node == doc.root() {
                    continue;
                }
                let Some(live) = doc.get(node) else { continue };
                let Some(parent_id) = live.parent().and_then(|p| mirror.index_of(p)) else {
                    continue;
                };
                let kind = live.kind();
                let index = mirror.insert_shadow_node(node, kind, parent_id, None);
                self.backfill.push_back(BackfillEntry { index, time });
            }

            self.observer = Some(doc.observe());
            let report = if ctx.config.validate_consistency {
                mirror.diagnose(&doc, RoutineDescriptor::discover())
            } else {
                None
            };
            info!(
                nodes = mirror.len(),
                backfill = self.backfill.len(),
                "document discovered"
            );
            self.mirror = Some(mirror);
            report
        };

        if let Some(report) = report {
            ctx.pipeline
                .instrument(Instrumentation::ShadowDomInconsistent(report));
        }
    }

    /// One backfill slice: upgrade placeholder layouts into real ones
    /// until the yield budget is spent, emitting Discover/Insert events
    /// that keep their discovery timestamps. When the last placeholder is
    /// upgraded, batches that queued behind backfill flush in arrival
    /// order.
    pub(crate) fn backfill_slice(&mut self, ctx: &PluginContext) {
        let deadline = ctx.pipeline.timestamp(true) + ctx.config.time_to_yield_ms as f64;
        let mut emitted: Vec<PartialEvent> = Vec::new();
        let mut candidates: Vec<i64> = Vec::new();

        {
            let doc = ctx.page.lock();
            let Some(mirror) = self.mirror.as_mut() else {
                return;
            };
            while let Some(entry) = self.backfill.pop_front() {
                // A node can disappear between discovery and its slice.
                if mirror.contains(entry.index) {
                    if let Some(state) = snapshot::build(
                        &doc,
                        mirror,
                        entry.index,
                        LayoutSource::Discover,
                        LayoutAction::Insert,
                        None,
                        &self.policy,
                    ) {
                        mirror.set_snapshot(entry.index, state.clone());
                        self.last_states.insert(entry.index, state.clone());
                        candidates.push(entry.index);
                        emitted.push(PartialEvent::at(entry.time, EventData::Layout(state)));
                    }
                }
                if ctx.pipeline.timestamp(true) >= deadline {
                    break;
                }
            }
        }

        if !emitted.is_empty() {
            ctx.pipeline.add_events(EventOrigin::Layout, emitted);
        }
        self.register_watches(ctx, &candidates);

        if self.backfill.is_empty() {
            debug!(queued = self.queued.len(), "backfill complete");
            self.flush_queued(ctx);
        }
    }
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;

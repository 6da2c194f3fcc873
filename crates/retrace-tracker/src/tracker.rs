//! The layout tracker plugin.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use retrace_core::{Plugin, PluginContext};
use retrace_dom::{DomEvent, DomEventKind, MutationRecord, NodeId, ObserverId};
use retrace_mirror::ShadowMirror;
use retrace_protocols::{
    EventData, EventOrigin, Instrumentation, LayoutAction, LayoutData, LayoutSource, LayoutState,
    PartialEvent, PluginError, RoutineDescriptor, ScrollPosition,
};

use crate::snapshot::{self, SnapshotPolicy};

/// Consecutive divergences that trip degraded mode.
const DEGRADE_THRESHOLD: u32 = 2;

pub(crate) struct BackfillEntry {
    pub index: i64,
    /// Discovery wall-clock time, preserved through backfill.
    pub time: f64,
}

pub(crate) struct StampedBatch {
    pub records: Vec<MutationRecord>,
    pub time: f64,
    pub sequence: u64,
}

/// The layout tracker.
///
/// Holds the shadow mirror for the page, the backfill queue of
/// placeholder indices, and the latest emitted layout state per index
/// (deep-copied whenever a watcher produces a follow-up).
pub struct LayoutTracker {
    pub(crate) mirror: Option<ShadowMirror>,
    pub(crate) observer: Option<ObserverId>,
    pub(crate) policy: SnapshotPolicy,
    pub(crate) backfill: VecDeque<BackfillEntry>,
    pub(crate) queued: VecDeque<StampedBatch>,
    pub(crate) mutation_sequence: u64,
    pub(crate) degraded: bool,
    pub(crate) watched: HashSet<i64>,
    pub(crate) last_states: HashMap<i64, LayoutState>,
    pub(crate) last_scroll: HashMap<i64, ScrollPosition>,
}

impl LayoutTracker {
    pub fn new() -> Self {
        Self {
            mirror: None,
            observer: None,
            policy: SnapshotPolicy::default(),
            backfill: VecDeque::new(),
            queued: VecDeque::new(),
            mutation_sequence: 0,
            degraded: false,
            watched: HashSet::new(),
            last_states: HashMap::new(),
            last_scroll: HashMap::new(),
        }
    }

    /// True once two consecutive batches diverged; mutations are received
    /// but no longer applied until reset.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Indices still awaiting backfill.
    pub fn backfill_pending(&self) -> usize {
        self.backfill.len()
    }

    /// Drain the mutation observer; stamp, queue, or process the batch.
    fn drain_mutations(&mut self, ctx: &PluginContext) {
        let Some(observer) = self.observer else {
            return;
        };
        let records = ctx.page.lock().take_records(observer);
        if records.is_empty() {
            return;
        }
        if self.degraded {
            debug!(records = records.len(), "degraded; mutation batch dropped");
            return;
        }
        self.mutation_sequence += 1;
        let batch = StampedBatch {
            records,
            time: ctx.pipeline.timestamp(false),
            sequence: self.mutation_sequence,
        };
        if !self.backfill.is_empty() {
            debug!(sequence = batch.sequence, "backfill incomplete; batch queued");
            self.queued.push_back(batch);
        } else {
            self.process_batch(ctx, batch, true);
        }
    }

    /// Flush batches that queued behind backfill, in arrival order. The
    /// consistency check is deferred to the last batch: the live tree is
    /// already at its terminal state, so intermediate checks would
    /// misreport.
    pub(crate) fn flush_queued(&mut self, ctx: &PluginContext) {
        while let Some(batch) = self.queued.pop_front() {
            let validate = self.queued.is_empty();
            self.process_batch(ctx, batch, validate);
            if self.degraded {
                self.queued.clear();
                return;
            }
        }
    }

    /// Classify one stamped batch and emit its layout events in
    /// insert, move, update, remove order.
    pub(crate) fn process_batch(&mut self, ctx: &PluginContext, batch: StampedBatch, validate: bool) {
        let StampedBatch {
            records,
            time,
            sequence,
        } = batch;

        let mut states: Vec<LayoutState> = Vec::new();
        let mut watch_candidates: Vec<i64> = Vec::new();
        let report = {
            let doc = ctx.page.lock();
            let Some(mirror) = self.mirror.as_mut() else {
                return;
            };
            let summary = mirror.apply_mutation_batch(&doc, &records);

            let report = if validate && ctx.config.validate_consistency {
                mirror.diagnose(&doc, RoutineDescriptor::mutation(sequence, records.len()))
            } else {
                None
            };

            if report.is_none() {
                let mut classified: Vec<(NodeId, LayoutAction)> = Vec::new();
                classified.extend(summary.new_nodes.iter().map(|&n| (n, LayoutAction::Insert)));
                classified.extend(summary.moved_nodes.iter().map(|&n| (n, LayoutAction::Move)));
                classified.extend(summary.updated_nodes.iter().map(|&n| (n, LayoutAction::Update)));
                for (node, action) in classified {
                    let Some(index) = mirror.index_of(node) else {
                        continue;
                    };
                    let Some(state) = snapshot::build(
                        &doc,
                        mirror,
                        index,
                        LayoutSource::Mutation,
                        action,
                        Some(sequence),
                        &self.policy,
                    ) else {
                        continue;
                    };
                    mirror.set_snapshot(index, state.clone());
                    self.last_states.insert(index, state.clone());
                    if matches!(action, LayoutAction::Insert | LayoutAction::Update) {
                        watch_candidates.push(index);
                    }
                    states.push(state);
                }
                for index in summary.removed {
                    let state = match self.last_states.remove(&index) {
                        Some(last) => {
                            let mut state = last.derive(LayoutSource::Mutation, LayoutAction::Remove);
                            state.mutation_sequence = Some(sequence);
                            state
                        }
                        None => LayoutState {
                            index,
                            parent: None,
                            previous: None,
                            next: None,
                            source: LayoutSource::Mutation,
                            action: LayoutAction::Remove,
                            tag: String::new(),
                            attributes: Default::default(),
                            layout: LayoutData::Ignored,
                            mutation_sequence: Some(sequence),
                        },
                    };
                    self.last_scroll.remove(&index);
                    self.watched.remove(&index);
                    states.push(state);
                }
            }
            report
        };

        if let Some(report) = report {
            ctx.pipeline
                .instrument(Instrumentation::ShadowDomInconsistent(report));
            let streak = self
                .mirror
                .as_ref()
                .map(|m| m.consecutive_inconsistencies())
                .unwrap_or(0);
            if streak >= DEGRADE_THRESHOLD {
                warn!(streak, "entering degraded mode; further mutations ignored");
                self.degraded = true;
            }
            return;
        }

        if !states.is_empty() {
            let partials = states
                .into_iter()
                .map(|state| PartialEvent::at(time, EventData::Layout(state)))
                .collect();
            ctx.pipeline.add_events(EventOrigin::Layout, partials);
        }
        self.register_watches(ctx, &watch_candidates);
    }
}

impl Default for LayoutTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LayoutTracker {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn origin(&self) -> EventOrigin {
        EventOrigin::Layout
    }

    fn reset(&mut self) {
        self.mirror = None;
        self.observer = None;
        self.backfill.clear();
        self.queued.clear();
        self.mutation_sequence = 0;
        self.degraded = false;
        self.watched.clear();
        self.last_states.clear();
        self.last_scroll.clear();
    }

    fn activate(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.policy = SnapshotPolicy::from_config(&ctx.config);
        self.discover(ctx);
        Ok(())
    }

    fn teardown(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        if let Some(observer) = self.observer.take() {
            ctx.page.lock().disconnect(observer);
        }
        // Dropping the mirror drops the side-table: every index annotation
        // reachable through the shadow document is cleared with it.
        let cleared = self.mirror.take().map(|m| m.len()).unwrap_or(0);
        self.backfill.clear();
        self.queued.clear();
        self.watched.clear();
        self.last_states.clear();
        self.last_scroll.clear();
        debug!(cleared, "layout tracker torn down");
        Ok(())
    }

    fn tick(&mut self, ctx: &PluginContext) {
        if self.mirror.is_none() {
            return;
        }
        if !self.backfill.is_empty() {
            self.backfill_slice(ctx);
        }
        self.drain_mutations(ctx);
    }

    fn on_dom_event(&mut self, ctx: &PluginContext, event: &DomEvent) {
        match event.kind {
            DomEventKind::Scroll => self.on_scroll(ctx, event.target),
            DomEventKind::Input | DomEventKind::Change => self.on_input(ctx, event.target),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;

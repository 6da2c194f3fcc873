//! The foreground event pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

use retrace_dom::{DomEventKind, ListenerId, NodeId, PageHandle};
use retrace_protocols::{
    AgentEvent, BatcherMessage, EventOrigin, Instrumentation, PartialEvent,
};

use crate::clock::SessionClock;

/// Stamps, sequences, and forwards events to the background batcher.
///
/// Delivery to the batcher preserves call order; event ids are allocated
/// exactly once, and a list handed to [`EventPipeline::add_events`] gets a
/// contiguous id range.
pub struct EventPipeline {
    clock: SessionClock,
    next_id: AtomicU64,
    tx: mpsc::UnboundedSender<BatcherMessage>,
    bindings: Mutex<Vec<ListenerId>>,
}

impl EventPipeline {
    pub fn new(clock: SessionClock, tx: mpsc::UnboundedSender<BatcherMessage>) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(1),
            tx,
            bindings: Mutex::new(Vec::new()),
        }
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// High-resolution milliseconds from session start when `relative`,
    /// wall-clock milliseconds otherwise.
    pub fn timestamp(&self, relative: bool) -> f64 {
        self.clock.timestamp(relative)
    }

    /// Complete a partial event and forward it. Returns the assigned id.
    pub fn add_event(&self, origin: EventOrigin, partial: PartialEvent) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.forward(id, origin, partial);
        id
    }

    /// Complete a list of partial events in order, with contiguous ids.
    pub fn add_events(&self, origin: EventOrigin, partials: Vec<PartialEvent>) -> Vec<u64> {
        let count = partials.len() as u64;
        let first = self.next_id.fetch_add(count, Ordering::SeqCst);
        partials
            .into_iter()
            .enumerate()
            .map(|(offset, partial)| {
                let id = first + offset as u64;
                self.forward(id, origin, partial);
                id
            })
            .collect()
    }

    /// Wrap a diagnostic record in a standard event and forward it.
    pub fn instrument(&self, record: Instrumentation) -> u64 {
        self.add_event(
            EventOrigin::Instrumentation,
            PartialEvent::new(retrace_protocols::EventData::Instrumentation(record)),
        )
    }

    fn forward(&self, id: u64, origin: EventOrigin, partial: PartialEvent) {
        let now = self.clock.wall_ms();
        let event = AgentEvent {
            id,
            origin,
            event_type: partial.data.event_type(),
            time: partial.time.unwrap_or(now),
            data: partial.data,
        };
        if self
            .tx
            .send(BatcherMessage::AddEvent { event, time: now })
            .is_err()
        {
            warn!("batcher channel closed; event {id} dropped");
        }
    }

    /// Ask the batcher to flush whatever it holds.
    pub fn force_compression(&self) {
        let time = self.clock.wall_ms();
        if self.tx.send(BatcherMessage::ForceCompression { time }).is_err() {
            warn!("batcher channel closed; flush request dropped");
        }
    }

    /// Signal the batcher to drain and exit.
    pub fn shutdown(&self) {
        let _ = self.tx.send(BatcherMessage::Shutdown);
    }

    /// Register a page listener and record it for mass unbind at teardown.
    pub fn bind(
        &self,
        page: &PageHandle,
        target: NodeId,
        kind: DomEventKind,
        owner: &str,
    ) -> ListenerId {
        let id = page.lock().add_listener(target, kind, owner);
        self.bindings.lock().push(id);
        id
    }

    /// Remove every listener this pipeline registered.
    pub fn unbind_all(&self, page: &PageHandle) {
        let bindings = std::mem::take(&mut *self.bindings.lock());
        let mut doc = page.lock();
        for id in bindings {
            doc.remove_listener(id);
        }
    }

    /// Number of recorded listener bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.lock().len()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

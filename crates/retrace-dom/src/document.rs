//! The live document: an arena tree with mutation journaling.

use tracing::warn;

use crate::geometry::{BoundingBox, ScrollOffsets, Viewport};
use crate::listener::{DomEvent, DomEventKind, ErrorDetail, EventDetail, Listener, ListenerId};
use crate::node::{Node, NodeId, NodeKind};
use crate::observer::{MutationRecord, ObserverId, ObserverSlot};
use crate::performance::PerformanceTimeline;

/// The live page: document tree, viewport, listeners, performance timeline.
///
/// Mutating operations journal `MutationRecord`s to every registered
/// observer. Removing a subtree detaches it but keeps its nodes alive, so a
/// later re-insertion is observable as a move; [`Document::collect`] is the
/// garbage-collection analog that actually frees nodes.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    url: String,
    user_agent: String,
    viewport: Viewport,
    viewport_scroll: ScrollOffsets,
    visible: bool,
    agent_active: bool,
    observers: Vec<ObserverSlot>,
    next_observer: u64,
    listeners: Vec<Listener>,
    next_listener: u64,
    events: Vec<DomEvent>,
    performance: PerformanceTimeline,
}

impl Document {
    pub fn new(url: impl Into<String>) -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![Node::new(root, NodeKind::Document, "#document".to_string())],
            root,
            url: url.into(),
            user_agent: String::new(),
            viewport: Viewport::default(),
            viewport_scroll: ScrollOffsets::default(),
            visible: true,
            agent_active: false,
            observers: Vec::new(),
            next_observer: 0,
            listeners: Vec::new(),
            next_listener: 0,
            events: Vec::new(),
            performance: PerformanceTimeline::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn viewport_scroll(&self) -> ScrollOffsets {
        self.viewport_scroll
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn performance(&self) -> &PerformanceTimeline {
        &self.performance
    }

    pub fn performance_mut(&mut self) -> &mut PerformanceTimeline {
        &mut self.performance
    }

    /// One agent per page; the session sets this at activation and clears
    /// it at teardown.
    pub fn agent_active(&self) -> bool {
        self.agent_active
    }

    pub fn set_agent_active(&mut self, active: bool) {
        self.agent_active = active;
    }

    // === Node construction and lookup ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element, tag.to_ascii_lowercase())
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::Text, "#text".to_string());
        self.nodes[id.0 as usize].text = text.to_string();
        id
    }

    fn alloc(&mut self, kind: NodeKind, tag: String) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, kind, tag));
        id
    }

    /// Look up a node; `None` once it has been collected.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).filter(|n| n.alive)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = id;
        loop {
            let Some(node) = self.get(cursor) else {
                return false;
            };
            if cursor == self.root {
                return true;
            }
            match node.parent {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// Child ids in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|n| n.first_child);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.get(child).and_then(|n| n.next_sibling);
        }
        out
    }

    /// Pre-order traversal of the subtree rooted at `id`, inclusive.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.get(current).is_none() {
                continue;
            }
            out.push(current);
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    // === Tree mutation ===

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` under `parent` before `reference`, or last when
    /// `reference` is `None`. A child attached elsewhere is detached first,
    /// and both sides are journaled, the way a mutation observer sees it.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            warn!("insert_before on a collected node");
            return;
        }
        if let Some(old_parent) = self.get(child).and_then(|n| n.parent) {
            self.unlink(child);
            self.journal(MutationRecord::child_list(old_parent, vec![], vec![child]));
        }

        match reference {
            Some(reference) if self.get(reference).map(|n| n.parent) == Some(Some(parent)) => {
                let before_prev = self.get(reference).and_then(|n| n.prev_sibling);
                self.node_mut(child).prev_sibling = before_prev;
                self.node_mut(child).next_sibling = Some(reference);
                self.node_mut(reference).prev_sibling = Some(child);
                match before_prev {
                    Some(prev) => self.node_mut(prev).next_sibling = Some(child),
                    None => self.node_mut(parent).first_child = Some(child),
                }
            }
            _ => {
                let last = self.get(parent).and_then(|n| n.last_child);
                self.node_mut(child).prev_sibling = last;
                self.node_mut(child).next_sibling = None;
                match last {
                    Some(last) => self.node_mut(last).next_sibling = Some(child),
                    None => self.node_mut(parent).first_child = Some(child),
                }
                self.node_mut(parent).last_child = Some(child);
            }
        }
        self.node_mut(child).parent = Some(parent);
        self.journal(MutationRecord::child_list(parent, vec![child], vec![]));
    }

    /// Detach `child` from its parent. The subtree stays alive.
    pub fn remove_child(&mut self, child: NodeId) {
        let Some(parent) = self.get(child).and_then(|n| n.parent) else {
            return;
        };
        self.unlink(child);
        self.journal(MutationRecord::child_list(parent, vec![], vec![child]));
    }

    fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.0 as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        let Some(parent) = parent else { return };
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
        let node = self.node_mut(child);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Free a subtree. Detaches first if still attached (journaled), then
    /// marks every node dead; stale handles into the subtree go `None`.
    pub fn collect(&mut self, id: NodeId) {
        if self.get(id).is_none() {
            return;
        }
        if self.get(id).and_then(|n| n.parent).is_some() {
            self.remove_child(id);
        }
        for node in self.descendants(id) {
            self.node_mut(node).alive = false;
        }
    }

    // === Content mutation ===

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if self.get(id).is_none() {
            return;
        }
        self.node_mut(id)
            .attributes
            .insert(name.to_string(), value.to_string());
        self.journal(MutationRecord::attributes(id, name));
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if self.get(id).map(|n| n.attributes.contains_key(name)) != Some(true) {
            return;
        }
        self.node_mut(id).attributes.remove(name);
        self.journal(MutationRecord::attributes(id, name));
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if self.get(id).map(|n| n.kind) != Some(NodeKind::Text) {
            return;
        }
        self.node_mut(id).text = text.to_string();
        self.journal(MutationRecord::character_data(id));
    }

    /// Update a form control's live value property. Fires no mutation; the
    /// host dispatches `input`/`change` events separately, as a browser
    /// would.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if self.get(id).is_none() {
            return;
        }
        self.node_mut(id).value = Some(value.to_string());
    }

    // === Geometry ===

    pub fn set_layout(&mut self, id: NodeId, layout: BoundingBox) {
        if self.get(id).is_none() {
            return;
        }
        self.node_mut(id).layout = layout;
    }

    /// Mark an element scrollable, with initial offsets.
    pub fn set_scrollable(&mut self, id: NodeId, x: f64, y: f64) {
        if self.get(id).is_none() {
            return;
        }
        self.node_mut(id).scroll = Some(ScrollOffsets { x, y });
    }

    /// Scroll an element and fire its `scroll` event.
    pub fn scroll_to(&mut self, id: NodeId, x: f64, y: f64) {
        if self.get(id).and_then(|n| n.scroll).is_none() {
            warn!("scroll_to on a non-scrollable node {id}");
            return;
        }
        self.node_mut(id).scroll = Some(ScrollOffsets { x, y });
        self.fire(id, DomEventKind::Scroll, EventDetail::None);
    }

    // === Viewport and environment ===

    pub fn set_viewport(&mut self, width: u32, height: u32, device_pixel_ratio: f64) {
        self.viewport = Viewport {
            width,
            height,
            device_pixel_ratio,
        };
        let root = self.root;
        self.fire(root, DomEventKind::Resize, EventDetail::None);
    }

    pub fn scroll_viewport(&mut self, x: f64, y: f64) {
        self.viewport_scroll = ScrollOffsets { x, y };
        let root = self.root;
        self.fire(root, DomEventKind::Scroll, EventDetail::None);
    }

    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
        let root = self.root;
        self.fire(root, DomEventKind::VisibilityChange, EventDetail::None);
    }

    /// Report an uncaught page error, as the `error` event would.
    pub fn emit_error(&mut self, message: &str, source: &str, line: u32, column: u32) {
        let root = self.root;
        self.fire(
            root,
            DomEventKind::Error,
            EventDetail::Error(ErrorDetail {
                message: message.to_string(),
                source: source.to_string(),
                line,
                column,
            }),
        );
    }

    // === Observers ===

    /// Register a mutation observer over the whole document.
    pub fn observe(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(ObserverSlot {
            id,
            pending: Vec::new(),
        });
        id
    }

    /// Drain an observer's pending records as one batch.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| std::mem::take(&mut slot.pending))
            .unwrap_or_default()
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        self.observers.retain(|slot| slot.id != id);
    }

    fn journal(&mut self, record: MutationRecord) {
        for slot in &mut self.observers {
            slot.pending.push(record.clone());
        }
    }

    // === Listeners and event dispatch ===

    pub fn add_listener(&mut self, target: NodeId, kind: DomEventKind, owner: &str) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            target,
            kind,
            owner: owner.to_string(),
        });
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|l| l.id != id);
    }

    /// Owners of listeners registered for `(target, kind)`.
    pub fn owners_for(&self, target: NodeId, kind: DomEventKind) -> Vec<String> {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.owner.clone())
            .collect()
    }

    /// Queue an event for delivery at the next session pump.
    pub fn fire(&mut self, target: NodeId, kind: DomEventKind, detail: EventDetail) {
        self.events.push(DomEvent {
            target,
            kind,
            detail,
        });
    }

    /// Dispatch a pointer event at viewport coordinates.
    pub fn fire_pointer(&mut self, kind: DomEventKind, x: f64, y: f64, buttons: u8) {
        let root = self.root;
        self.fire(
            root,
            kind,
            EventDetail::Pointer(crate::listener::PointerDetail { x, y, buttons }),
        );
    }

    /// Drain the queued events.
    pub fn drain_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

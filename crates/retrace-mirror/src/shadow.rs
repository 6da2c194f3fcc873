//! The shadow tree arena.

use std::collections::HashMap;

use retrace_dom::{NodeId, NodeKind};
use retrace_protocols::LayoutState;

use crate::table::IndexTable;
use crate::ROOT_INDEX;

/// One shadow record. Links are ids into the arena, never pointers; `node`
/// is the live handle the record mirrors.
#[derive(Debug, Clone)]
pub struct ShadowNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub first_child_id: Option<i64>,
    pub next_sibling_id: Option<i64>,
    pub kind: NodeKind,
    /// Last-recorded layout; `None` while the node awaits backfill.
    pub snapshot: Option<LayoutState>,
    pub node: NodeId,
}

/// Arena of shadow records rooted at the shadow document, indexed by id.
#[derive(Debug)]
pub struct ShadowTree {
    nodes: HashMap<i64, ShadowNode>,
    table: IndexTable,
}

impl ShadowTree {
    pub fn new(root: NodeId) -> Self {
        let table = IndexTable::new(root);
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_INDEX,
            ShadowNode {
                id: ROOT_INDEX,
                parent_id: None,
                first_child_id: None,
                next_sibling_id: None,
                kind: NodeKind::Document,
                snapshot: None,
                node: root,
            },
        );
        Self { nodes, table }
    }

    pub fn root(&self) -> i64 {
        ROOT_INDEX
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: i64) -> Option<&ShadowNode> {
        self.nodes.get(&id)
    }

    pub fn index_of(&self, node: NodeId) -> Option<i64> {
        self.table.index_of(node)
    }

    pub fn node_of(&self, id: i64) -> Option<NodeId> {
        self.table.node_of(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes.keys().copied()
    }

    pub fn set_snapshot(&mut self, id: i64, snapshot: LayoutState) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.snapshot = Some(snapshot);
        }
    }

    pub fn snapshot(&self, id: i64) -> Option<&LayoutState> {
        self.nodes.get(&id).and_then(|n| n.snapshot.as_ref())
    }

    /// Insert a live node into the shadow under `parent_id`, before
    /// `next_sibling_id` (or last when `None`). Allocates and returns the
    /// node's index.
    pub fn insert(
        &mut self,
        node: NodeId,
        kind: NodeKind,
        parent_id: i64,
        next_sibling_id: Option<i64>,
    ) -> i64 {
        let id = self.table.assign(node);
        self.nodes.insert(
            id,
            ShadowNode {
                id,
                parent_id: Some(parent_id),
                first_child_id: None,
                next_sibling_id: None,
                kind,
                snapshot: None,
                node,
            },
        );
        self.link(id, parent_id, next_sibling_id);
        id
    }

    /// Splice `id` into `parent_id`'s child chain before `next_sibling_id`.
    fn link(&mut self, id: i64, parent_id: i64, next_sibling_id: Option<i64>) {
        match next_sibling_id.filter(|&next| self.child_of(parent_id, next)) {
            Some(next) => {
                let hook = match self.previous_sibling(next) {
                    Some(prev) => prev,
                    None => parent_id,
                };
                self.set_link(hook, Some(id), hook == parent_id);
                self.set_link(id, Some(next), false);
            }
            None => match self.last_child(parent_id) {
                Some(last) => self.set_link(last, Some(id), false),
                None => self.set_link(parent_id, Some(id), true),
            },
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = Some(parent_id);
        }
    }

    fn set_link(&mut self, at: i64, to: Option<i64>, as_first_child: bool) {
        if let Some(node) = self.nodes.get_mut(&at) {
            if as_first_child {
                node.first_child_id = to;
            } else {
                node.next_sibling_id = to;
            }
        }
    }

    fn child_of(&self, parent_id: i64, id: i64) -> bool {
        self.get(id).map(|n| n.parent_id) == Some(Some(parent_id))
    }

    /// Child ids of `parent_id` in shadow order.
    pub fn children(&self, parent_id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut cursor = self.get(parent_id).and_then(|n| n.first_child_id);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.get(id).and_then(|n| n.next_sibling_id);
        }
        out
    }

    pub fn previous_sibling(&self, id: i64) -> Option<i64> {
        let parent = self.get(id)?.parent_id?;
        let mut prev = None;
        let mut cursor = self.get(parent)?.first_child_id;
        while let Some(current) = cursor {
            if current == id {
                return prev;
            }
            prev = Some(current);
            cursor = self.get(current)?.next_sibling_id;
        }
        None
    }

    /// Current tree position of a shadow node: `(parent, previous sibling)`.
    pub fn position(&self, id: i64) -> (Option<i64>, Option<i64>) {
        (
            self.get(id).and_then(|n| n.parent_id),
            self.previous_sibling(id),
        )
    }

    fn last_child(&self, parent_id: i64) -> Option<i64> {
        self.children(parent_id).last().copied()
    }

    /// Unlink `id` from its parent chain, keeping its subtree intact.
    pub fn unlink(&mut self, id: i64) {
        let Some(parent) = self.get(id).and_then(|n| n.parent_id) else {
            return;
        };
        let next = self.get(id).and_then(|n| n.next_sibling_id);
        match self.previous_sibling(id) {
            Some(prev) => {
                if let Some(node) = self.nodes.get_mut(&prev) {
                    node.next_sibling_id = next;
                }
            }
            None => {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.first_child_id = next;
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = None;
            node.next_sibling_id = None;
        }
    }

    /// Detach a subtree: unlink it, then remove every record in it and
    /// clear the index annotations. Returns the cleared indices, root
    /// first, in pre-order.
    pub fn detach(&mut self, id: i64) -> Vec<i64> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.unlink(id);
        let mut cleared = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            cleared.push(current);
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
            self.nodes.remove(&current);
            self.table.clear(current);
        }
        cleared
    }

    /// Rebuild `parent_id`'s child chain to the given order, reparenting
    /// each child. Used after a batch to align the shadow with live order.
    pub fn resync_children(&mut self, parent_id: i64, ordered: &[i64]) {
        let Some(parent) = self.nodes.get_mut(&parent_id) else {
            return;
        };
        parent.first_child_id = ordered.first().copied();
        for (i, &child) in ordered.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent_id = Some(parent_id);
                node.next_sibling_id = ordered.get(i + 1).copied();
            }
        }
    }
}

#[cfg(test)]
#[path = "shadow_tests.rs"]
mod tests;

//! Mutation batch classification.
//!
//! A batch of raw records resolves into four disjoint sets. Classification
//! is terminal-state-wins: each touched node is judged against the live
//! tree after the whole batch, so intermediate states inside one batch are
//! never reported.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use retrace_dom::{Document, MutationKind, MutationRecord, NodeId};

use crate::mirror::ShadowMirror;

/// Outcome of one mutation batch, in emission order per class.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Newly indexed nodes, in depth-first insertion order.
    pub new_nodes: Vec<NodeId>,
    /// Known nodes whose terminal position differs from the shadow.
    pub moved_nodes: Vec<NodeId>,
    /// Known nodes still in place with attribute or text changes.
    pub updated_nodes: Vec<NodeId>,
    /// Indices of detached subtree roots; their annotations are cleared.
    pub removed: Vec<i64>,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.new_nodes.is_empty()
            && self.moved_nodes.is_empty()
            && self.updated_nodes.is_empty()
            && self.removed.is_empty()
    }
}

impl ShadowMirror {
    /// Resolve an ordered batch of raw mutation records against the shadow.
    ///
    /// On return the shadow's tree shape matches the live document for
    /// every touched parent; the summary lists what to report. A node both
    /// added and removed within the batch classifies by where it ended up.
    pub fn apply_mutation_batch(
        &mut self,
        doc: &Document,
        records: &[MutationRecord],
    ) -> BatchSummary {
        let mut structural: Vec<NodeId> = Vec::new();
        let mut seen = HashSet::new();
        let mut content: Vec<NodeId> = Vec::new();
        for record in records {
            match record.kind {
                MutationKind::ChildList => {
                    for &node in record.removed.iter().chain(record.added.iter()) {
                        if seen.insert(node) {
                            structural.push(node);
                        }
                    }
                }
                MutationKind::Attributes | MutationKind::CharacterData => {
                    content.push(record.target);
                }
            }
        }

        // Shadow positions before any structural repair, for terminal
        // move detection.
        let before: HashMap<NodeId, (Option<i64>, Option<i64>)> = structural
            .iter()
            .filter_map(|&node| {
                self.tree
                    .index_of(node)
                    .map(|index| (node, self.tree.position(index)))
            })
            .collect();

        let mut summary = BatchSummary::default();
        let mut fresh: HashSet<NodeId> = HashSet::new();

        // Removals: known nodes whose live tree no longer contains them.
        for &node in &structural {
            let Some(index) = self.tree.index_of(node) else {
                continue;
            };
            if doc.is_attached(node) {
                continue;
            }
            if self.tree.contains(index) {
                self.tree.detach(index);
                summary.removed.push(index);
            }
        }

        // New nodes: absent from the shadow, attached under an indexed
        // ancestor. Indexing descends, so one candidate can cover a
        // whole subtree.
        for &node in &structural {
            if self.tree.index_of(node).is_some() || !doc.is_attached(node) {
                continue;
            }
            let mut top = node;
            while let Some(parent) = doc.get(top).and_then(|n| n.parent()) {
                if self.tree.index_of(parent).is_some() {
                    break;
                }
                top = parent;
            }
            self.index_new_subtree(doc, top, &mut summary.new_nodes, &mut fresh);
        }

        // Moves: known, attached, and the terminal position differs from
        // the shadow position at batch start.
        let mut moved_set: HashSet<NodeId> = HashSet::new();
        for &node in &structural {
            if fresh.contains(&node) {
                continue;
            }
            if self.tree.index_of(node).is_none() || !doc.is_attached(node) {
                continue;
            }
            let live = self.live_position(doc, node);
            if before.get(&node) != Some(&live) {
                summary.moved_nodes.push(node);
                moved_set.insert(node);
            }
        }

        // Align every touched parent's shadow child chain with live order.
        let mut parents: Vec<i64> = Vec::new();
        let mut parent_seen = HashSet::new();
        for &node in summary.new_nodes.iter().chain(summary.moved_nodes.iter()) {
            if let Some(parent) = doc.get(node).and_then(|n| n.parent()) {
                if let Some(parent_id) = self.tree.index_of(parent) {
                    if parent_seen.insert(parent_id) {
                        parents.push(parent_id);
                    }
                }
            }
        }
        for &node in &summary.moved_nodes {
            if let Some(&(Some(old_parent), _)) = before.get(&node) {
                if self.tree.contains(old_parent) && parent_seen.insert(old_parent) {
                    parents.push(old_parent);
                }
            }
        }
        for parent_id in parents {
            let Some(parent_node) = self.tree.node_of(parent_id) else {
                continue;
            };
            let ordered: Vec<i64> = doc
                .children(parent_node)
                .into_iter()
                .filter_map(|child| self.tree.index_of(child))
                .collect();
            self.tree.resync_children(parent_id, &ordered);
        }

        // Updates: present, still in place, content changed.
        let mut updated_seen = HashSet::new();
        for node in content {
            if !updated_seen.insert(node) || fresh.contains(&node) || moved_set.contains(&node) {
                continue;
            }
            if self.tree.index_of(node).is_some() && doc.is_attached(node) {
                summary.updated_nodes.push(node);
            }
        }

        debug!(
            new = summary.new_nodes.len(),
            moved = summary.moved_nodes.len(),
            updated = summary.updated_nodes.len(),
            removed = summary.removed.len(),
            "mutation batch classified"
        );
        summary
    }

    /// Index every unindexed node of the subtree at `top`, pre-order, each
    /// placed under its live parent before its nearest indexed next
    /// sibling.
    fn index_new_subtree(
        &mut self,
        doc: &Document,
        top: NodeId,
        new_nodes: &mut Vec<NodeId>,
        fresh: &mut HashSet<NodeId>,
    ) {
        for node in doc.descendants(top) {
            if self.tree.index_of(node).is_some() {
                continue;
            }
            let Some(live) = doc.get(node) else { continue };
            let Some(parent_id) = live.parent().and_then(|p| self.tree.index_of(p)) else {
                continue;
            };
            let next_id = self.nearest_indexed_next_sibling(doc, node);
            let kind = live.kind();
            self.tree.insert(node, kind, parent_id, next_id);
            new_nodes.push(node);
            fresh.insert(node);
        }
    }

    fn nearest_indexed_next_sibling(&self, doc: &Document, node: NodeId) -> Option<i64> {
        let mut cursor = doc.get(node).and_then(|n| n.next_sibling());
        while let Some(sibling) = cursor {
            if let Some(id) = self.tree.index_of(sibling) {
                return Some(id);
            }
            cursor = doc.get(sibling).and_then(|n| n.next_sibling());
        }
        None
    }

    /// Terminal position of a live node in index space: `(parent index,
    /// nearest indexed previous sibling)`.
    fn live_position(&self, doc: &Document, node: NodeId) -> (Option<i64>, Option<i64>) {
        let parent = doc
            .get(node)
            .and_then(|n| n.parent())
            .and_then(|p| self.tree.index_of(p));
        let mut previous = None;
        let mut cursor = doc.get(node).and_then(|n| n.prev_sibling());
        while let Some(sibling) = cursor {
            if let Some(id) = self.tree.index_of(sibling) {
                previous = Some(id);
                break;
            }
            cursor = doc.get(sibling).and_then(|n| n.prev_sibling());
        }
        (parent, previous)
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

//! The index side-table: live node handle to observed index, both ways.

use std::collections::HashMap;

use retrace_dom::NodeId;

use crate::ROOT_INDEX;

/// Observed-index assignment. Indices are allocated monotonically at first
/// sighting and never reused within a session.
#[derive(Debug)]
pub struct IndexTable {
    by_node: HashMap<NodeId, i64>,
    by_index: HashMap<i64, NodeId>,
    next: i64,
}

impl IndexTable {
    /// Start a table with the document root pre-assigned to [`ROOT_INDEX`].
    pub fn new(root: NodeId) -> Self {
        let mut table = Self {
            by_node: HashMap::new(),
            by_index: HashMap::new(),
            next: ROOT_INDEX + 1,
        };
        table.by_node.insert(root, ROOT_INDEX);
        table.by_index.insert(ROOT_INDEX, root);
        table
    }

    /// Assign the next index to `node`. The caller guarantees the node is
    /// unindexed.
    pub fn assign(&mut self, node: NodeId) -> i64 {
        debug_assert!(!self.by_node.contains_key(&node));
        let index = self.next;
        self.next += 1;
        self.by_node.insert(node, index);
        self.by_index.insert(index, node);
        index
    }

    pub fn index_of(&self, node: NodeId) -> Option<i64> {
        self.by_node.get(&node).copied()
    }

    pub fn node_of(&self, index: i64) -> Option<NodeId> {
        self.by_index.get(&index).copied()
    }

    /// Clear the annotation for one index. The index is retired, never
    /// handed out again.
    pub fn clear(&mut self, index: i64) {
        if let Some(node) = self.by_index.remove(&index) {
            self.by_node.remove(&node);
        }
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

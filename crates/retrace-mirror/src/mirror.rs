//! The mirror surface: shadow tree plus consistency bookkeeping.

use retrace_dom::{NodeId, NodeKind};
use retrace_protocols::{IndexTree, LayoutState, ShadowDomInconsistency};

use crate::shadow::{ShadowNode, ShadowTree};

/// A shadow mirror of one live document.
///
/// Owns the shadow arena and the index side-table, applies classified
/// mutation batches, and diagnoses divergence from the live tree.
#[derive(Debug)]
pub struct ShadowMirror {
    pub(crate) tree: ShadowTree,
    pub(crate) last_consistent: Option<IndexTree>,
    pub(crate) consecutive_inconsistencies: u32,
    pub(crate) first_report: Option<ShadowDomInconsistency>,
}

impl ShadowMirror {
    pub fn new(root: NodeId) -> Self {
        Self {
            tree: ShadowTree::new(root),
            last_consistent: None,
            consecutive_inconsistencies: 0,
            first_report: None,
        }
    }

    /// The shadow document record.
    pub fn shadow_document(&self) -> &ShadowNode {
        self.tree.get(self.tree.root()).expect("shadow root exists")
    }

    /// Insert a live node under `parent_id`, before `next_sibling_id`.
    /// Returns the allocated index.
    pub fn insert_shadow_node(
        &mut self,
        node: NodeId,
        kind: NodeKind,
        parent_id: i64,
        next_sibling_id: Option<i64>,
    ) -> i64 {
        self.tree.insert(node, kind, parent_id, next_sibling_id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.tree.contains(id)
    }

    pub fn get(&self, id: i64) -> Option<&ShadowNode> {
        self.tree.get(id)
    }

    pub fn index_of(&self, node: NodeId) -> Option<i64> {
        self.tree.index_of(node)
    }

    pub fn node_of(&self, id: i64) -> Option<NodeId> {
        self.tree.node_of(id)
    }

    pub fn set_snapshot(&mut self, id: i64, snapshot: LayoutState) {
        self.tree.set_snapshot(id, snapshot);
    }

    pub fn snapshot(&self, id: i64) -> Option<&LayoutState> {
        self.tree.snapshot(id)
    }

    /// Tree position of a shadow node: `(parent, previous sibling)`.
    pub fn position(&self, id: i64) -> (Option<i64>, Option<i64>) {
        self.tree.position(id)
    }

    pub fn next_sibling(&self, id: i64) -> Option<i64> {
        self.tree.get(id).and_then(|n| n.next_sibling_id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.tree.ids().collect()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

//! Shadow-vs-live consistency diagnosis.

use tracing::{debug, warn};

use retrace_dom::{Document, NodeId};
use retrace_protocols::{IndexTree, RoutineDescriptor, ShadowDomInconsistency};

use crate::mirror::ShadowMirror;

impl ShadowMirror {
    /// Index tree of the live document: each node labelled with its
    /// observed index, `-1` where a reachable node has none.
    pub fn index_tree(&self, doc: &Document) -> IndexTree {
        self.live_subtree(doc, doc.root())
    }

    fn live_subtree(&self, doc: &Document, node: NodeId) -> IndexTree {
        IndexTree {
            id: self.tree.index_of(node).unwrap_or(-1),
            children: doc
                .children(node)
                .into_iter()
                .map(|child| self.live_subtree(doc, child))
                .collect(),
        }
    }

    /// Index tree of the shadow, by shadow links.
    pub fn shadow_index_tree(&self) -> IndexTree {
        self.shadow_subtree(self.tree.root())
    }

    fn shadow_subtree(&self, id: i64) -> IndexTree {
        IndexTree {
            id,
            children: self
                .tree
                .children(id)
                .into_iter()
                .map(|child| self.shadow_subtree(child))
                .collect(),
        }
    }

    /// Shape and per-node indices agree between live and shadow.
    pub fn is_consistent(&self, doc: &Document) -> bool {
        self.index_tree(doc) == self.shadow_index_tree()
    }

    /// Check consistency and produce a diagnosis on divergence.
    ///
    /// A consistent check records the agreed tree and resets the
    /// consecutive counter. A divergent check returns a report carrying
    /// both trees, the last agreed tree, and the routine that ran; the
    /// second consecutive report carries the first inside it.
    pub fn diagnose(
        &mut self,
        doc: &Document,
        routine: RoutineDescriptor,
    ) -> Option<ShadowDomInconsistency> {
        let dom = self.index_tree(doc);
        let shadow = self.shadow_index_tree();
        if dom == shadow {
            debug!(nodes = dom.len(), "shadow consistent");
            self.last_consistent = Some(dom);
            self.consecutive_inconsistencies = 0;
            self.first_report = None;
            return None;
        }

        self.consecutive_inconsistencies += 1;
        warn!(
            consecutive = self.consecutive_inconsistencies,
            "shadow diverged from live document"
        );
        let report = ShadowDomInconsistency {
            dom,
            shadow,
            last_consistent: self.last_consistent.clone(),
            last_routine: routine,
            first: if self.consecutive_inconsistencies >= 2 {
                self.first_report.take().map(Box::new)
            } else {
                None
            },
        };
        if self.consecutive_inconsistencies == 1 {
            self.first_report = Some(report.clone());
        }
        Some(report)
    }

    /// Consecutive divergent checks; two is the degraded-mode threshold.
    pub fn consecutive_inconsistencies(&self) -> u32 {
        self.consecutive_inconsistencies
    }
}

#[cfg(test)]
#[path = "consistency_tests.rs"]
mod tests;

//! Layout states: structured snapshots of one node at one instant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a layout state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutSource {
    /// Initial document traversal or backfill.
    Discover,
    /// A classified mutation batch.
    Mutation,
    /// A watched element scrolled.
    Scroll,
    /// A watched form control changed.
    Input,
}

/// What happened to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAction {
    Insert,
    Update,
    Move,
    Remove,
}

/// Scroll offsets of a scrollable element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

/// Content payload of a layout state.
///
/// Elements carry geometry (plus scroll offsets when the element is
/// scrollable); text nodes carry their content; policy-excluded nodes
/// participate in tree shape only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutData {
    Box {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        scroll: Option<ScrollPosition>,
    },
    Text {
        content: String,
    },
    Ignored,
}

impl LayoutData {
    /// Scroll offsets, if this state describes a scrollable element.
    pub fn scroll(&self) -> Option<ScrollPosition> {
        match self {
            LayoutData::Box { scroll, .. } => *scroll,
            _ => None,
        }
    }
}

/// A value object describing one node at one point in time.
///
/// Immutable once emitted; the tracker retains the latest state per index
/// and deep-copies it when a watcher produces a follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
    /// Observed index of the node. Assigned at first sighting, never reused.
    pub index: i64,
    /// Observed index of the parent, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    /// Observed index of the previous sibling, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<i64>,
    /// Observed index of the next sibling, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<i64>,
    pub source: LayoutSource,
    pub action: LayoutAction,
    /// Lowercase tag name; `"#text"` for text nodes.
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    pub layout: LayoutData,
    /// Sequence of the mutation batch that produced this state, when
    /// `source` is `Mutation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutation_sequence: Option<u64>,
}

impl LayoutState {
    /// Derive a follow-up state from this one, keeping tree position and
    /// content but restamping source and action.
    pub fn derive(&self, source: LayoutSource, action: LayoutAction) -> Self {
        let mut next = self.clone();
        next.source = source;
        next.action = action;
        next.mutation_sequence = None;
        next
    }
}

/// A tree of observed indices, used by consistency diagnosis.
///
/// Nodes reference children structurally; no live handles are carried, so
/// the tree can travel inside an instrumentation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTree {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IndexTree>,
}

impl IndexTree {
    pub fn leaf(id: i64) -> Self {
        Self {
            id,
            children: Vec::new(),
        }
    }

    pub fn with_children(id: i64, children: Vec<IndexTree>) -> Self {
        Self { id, children }
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(IndexTree::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;

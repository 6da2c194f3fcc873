//! Nodes of the live document arena.

use std::collections::BTreeMap;

use crate::geometry::{BoundingBox, ScrollOffsets};

/// Handle to a live node. Valid for the lifetime of the document; a
/// collected node's handle dangles and lookups on it return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

/// One live node.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    /// Lowercase tag name; `#document` / `#text` for non-elements.
    pub(crate) tag: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) text: String,
    /// Live form-control value property; distinct from the `value`
    /// attribute, which never follows user input.
    pub(crate) value: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) layout: BoundingBox,
    /// `Some` when the element is scrollable.
    pub(crate) scroll: Option<ScrollOffsets>,
    pub(crate) alive: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, tag: String) -> Self {
        Self {
            id,
            kind,
            tag,
            attributes: BTreeMap::new(),
            text: String::new(),
            value: None,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            layout: BoundingBox::default(),
            scroll: None,
            alive: true,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    pub fn layout(&self) -> BoundingBox {
        self.layout
    }

    pub fn scroll(&self) -> Option<ScrollOffsets> {
        self.scroll
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }
}

//! Layout snapshot construction and content-capture policy.

use std::collections::{BTreeMap, HashSet};

use retrace_config::AgentConfig;
use retrace_dom::{Document, NodeId, NodeKind};
use retrace_mirror::ShadowMirror;
use retrace_protocols::{
    LayoutAction, LayoutData, LayoutSource, LayoutState, ScrollPosition,
};

/// Tags whose subtrees carry no replayable content. They keep their place
/// in the tree shape but never expose attributes or text.
const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Content-capture policy, snapshotted from config at activation.
#[derive(Debug, Clone)]
pub struct SnapshotPolicy {
    sensitive: HashSet<String>,
    show_text: bool,
    show_images: bool,
}

impl SnapshotPolicy {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            sensitive: config.sensitive_attributes.iter().cloned().collect(),
            show_text: config.show_text,
            show_images: config.show_images,
        }
    }

    /// Mask a captured value: same length, nothing legible.
    pub fn wash(text: &str) -> String {
        text.chars()
            .map(|c| if c.is_whitespace() { c } else { '*' })
            .collect()
    }

    pub fn mask_value(&self, name: &str, value: &str) -> String {
        if self.sensitive.contains(name) {
            Self::wash(value)
        } else {
            value.to_string()
        }
    }
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

fn is_ignored_tag(tag: &str) -> bool {
    IGNORED_TAGS.contains(&tag)
}

/// Whether the node or any ancestor carries an ignored tag.
fn in_ignored_subtree(doc: &Document, node: NodeId) -> bool {
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let Some(live) = doc.get(current) else {
            return false;
        };
        if live.is_element() && is_ignored_tag(live.tag()) {
            return true;
        }
        cursor = live.parent();
    }
    false
}

/// Build the layout state for one indexed node.
///
/// Tree position comes from the shadow links; content honours the capture
/// policy. Returns `None` when the index or its live node is gone.
pub(crate) fn build(
    doc: &Document,
    mirror: &ShadowMirror,
    index: i64,
    source: LayoutSource,
    action: LayoutAction,
    mutation_sequence: Option<u64>,
    policy: &SnapshotPolicy,
) -> Option<LayoutState> {
    let node = mirror.node_of(index)?;
    let live = doc.get(node)?;
    let (parent, previous) = mirror.position(index);
    let next = mirror.next_sibling(index);

    let ignored = in_ignored_subtree(doc, node);
    let mut attributes = BTreeMap::new();
    let layout = if ignored {
        LayoutData::Ignored
    } else {
        match live.kind() {
            NodeKind::Text => LayoutData::Text {
                content: if policy.show_text {
                    live.text().to_string()
                } else {
                    SnapshotPolicy::wash(live.text())
                },
            },
            _ => {
                for (name, value) in live.attributes() {
                    if !policy.show_images && live.tag() == "img" && name == "src" {
                        continue;
                    }
                    attributes.insert(name.clone(), policy.mask_value(name, value));
                }
                if let Some(value) = live.value() {
                    attributes.insert("value".to_string(), policy.mask_value("value", value));
                }
                let rect = live.layout();
                LayoutData::Box {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    scroll: live.scroll().map(|s| ScrollPosition { x: s.x, y: s.y }),
                }
            }
        }
    };

    Some(LayoutState {
        index,
        parent,
        previous,
        next,
        source,
        action,
        tag: live.tag().to_string(),
        attributes,
        layout,
        mutation_sequence,
    })
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

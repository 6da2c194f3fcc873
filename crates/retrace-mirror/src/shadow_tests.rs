use super::*;
use retrace_dom::Document;

fn tree_with_doc() -> (Document, ShadowTree) {
    let doc = Document::new("https://example.test/");
    let tree = ShadowTree::new(doc.root());
    (doc, tree)
}

#[test]
fn insert_appends_and_links() {
    let (mut doc, mut tree) = tree_with_doc();
    let a = doc.create_element("div");
    let b = doc.create_element("div");

    let ia = tree.insert(a, NodeKind::Element, ROOT_INDEX, None);
    let ib = tree.insert(b, NodeKind::Element, ROOT_INDEX, None);

    assert_eq!(tree.children(ROOT_INDEX), vec![ia, ib]);
    assert_eq!(tree.previous_sibling(ib), Some(ia));
    assert_eq!(tree.index_of(a), Some(ia));
    assert_eq!(tree.node_of(ib), Some(b));
}

#[test]
fn insert_before_a_sibling() {
    let (mut doc, mut tree) = tree_with_doc();
    let a = doc.create_element("div");
    let c = doc.create_element("div");
    let b = doc.create_element("div");

    let ia = tree.insert(a, NodeKind::Element, ROOT_INDEX, None);
    let ic = tree.insert(c, NodeKind::Element, ROOT_INDEX, None);
    let ib = tree.insert(b, NodeKind::Element, ROOT_INDEX, Some(ic));

    assert_eq!(tree.children(ROOT_INDEX), vec![ia, ib, ic]);
    assert_eq!(tree.position(ib), (Some(ROOT_INDEX), Some(ia)));
}

#[test]
fn detach_clears_subtree_and_annotations() {
    let (mut doc, mut tree) = tree_with_doc();
    let div = doc.create_element("div");
    let span = doc.create_element("span");
    let idiv = tree.insert(div, NodeKind::Element, ROOT_INDEX, None);
    let ispan = tree.insert(span, NodeKind::Element, idiv, None);

    let cleared = tree.detach(idiv);
    assert_eq!(cleared, vec![idiv, ispan]);
    assert!(!tree.contains(idiv));
    assert!(!tree.contains(ispan));
    assert!(tree.index_of(div).is_none());
    assert!(tree.index_of(span).is_none());
    assert!(tree.children(ROOT_INDEX).is_empty());
}

#[test]
fn resync_children_reorders_and_reparents() {
    let (mut doc, mut tree) = tree_with_doc();
    let a = doc.create_element("div");
    let b = doc.create_element("div");
    let c = doc.create_element("div");
    let ia = tree.insert(a, NodeKind::Element, ROOT_INDEX, None);
    let ib = tree.insert(b, NodeKind::Element, ROOT_INDEX, None);
    let ic = tree.insert(c, NodeKind::Element, ia, None);

    // c hops up to the root, between a and b.
    tree.resync_children(ROOT_INDEX, &[ia, ic, ib]);
    tree.resync_children(ia, &[]);

    assert_eq!(tree.children(ROOT_INDEX), vec![ia, ic, ib]);
    assert_eq!(tree.get(ic).unwrap().parent_id, Some(ROOT_INDEX));
    assert!(tree.children(ia).is_empty());
}

#[test]
fn snapshots_attach_to_records() {
    let (mut doc, mut tree) = tree_with_doc();
    let div = doc.create_element("div");
    let idiv = tree.insert(div, NodeKind::Element, ROOT_INDEX, None);
    assert!(tree.snapshot(idiv).is_none());

    let state = retrace_protocols::LayoutState {
        index: idiv,
        parent: Some(ROOT_INDEX),
        previous: None,
        next: None,
        source: retrace_protocols::LayoutSource::Discover,
        action: retrace_protocols::LayoutAction::Insert,
        tag: "div".to_string(),
        attributes: Default::default(),
        layout: retrace_protocols::LayoutData::Ignored,
        mutation_sequence: None,
    };
    tree.set_snapshot(idiv, state.clone());
    assert_eq!(tree.snapshot(idiv), Some(&state));
}

use super::*;
use retrace_dom::BoundingBox;

fn setup() -> (Document, ShadowMirror) {
    let mut doc = Document::new("https://example.test/");
    let root = doc.root();
    let body = doc.create_element("body");
    doc.append_child(root, body);
    let mut mirror = ShadowMirror::new(root);
    mirror.insert_shadow_node(body, NodeKind::Element, 0, None);
    (doc, mirror)
}

fn index_node(doc: &Document, mirror: &mut ShadowMirror, node: NodeId) -> i64 {
    let live = doc.get(node).unwrap();
    let parent_id = mirror.index_of(live.parent().unwrap()).unwrap();
    mirror.insert_shadow_node(node, live.kind(), parent_id, None)
}

#[test]
fn element_snapshot_carries_geometry_and_attributes() {
    let (mut doc, mut mirror) = setup();
    let body = doc.children(doc.root())[0];
    let div = doc.create_element("div");
    doc.set_attribute(div, "class", "hero");
    doc.set_layout(div, BoundingBox { x: 1.0, y: 2.0, width: 30.0, height: 40.0 });
    doc.set_scrollable(div, 0.0, 12.0);
    doc.append_child(body, div);
    let index = index_node(&doc, &mut mirror, div);

    let state = build(
        &doc,
        &mirror,
        index,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &SnapshotPolicy::default(),
    )
    .unwrap();

    assert_eq!(state.tag, "div");
    assert_eq!(state.parent, mirror.index_of(body));
    assert_eq!(state.attributes.get("class").map(String::as_str), Some("hero"));
    match state.layout {
        LayoutData::Box { width, scroll, .. } => {
            assert_eq!(width, 30.0);
            assert_eq!(scroll, Some(ScrollPosition { x: 0.0, y: 12.0 }));
        }
        other => panic!("unexpected layout: {other:?}"),
    }
}

#[test]
fn sensitive_attributes_are_washed_to_length() {
    let (mut doc, mut mirror) = setup();
    let body = doc.children(doc.root())[0];
    let input = doc.create_element("input");
    doc.append_child(body, input);
    doc.set_value(input, "hunter two");
    let index = index_node(&doc, &mut mirror, input);

    let state = build(
        &doc,
        &mirror,
        index,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &SnapshotPolicy::default(),
    )
    .unwrap();

    assert_eq!(
        state.attributes.get("value").map(String::as_str),
        Some("****** ***")
    );
}

#[test]
fn hidden_text_is_washed() {
    let (mut doc, mut mirror) = setup();
    let body = doc.children(doc.root())[0];
    let text = doc.create_text("secret words");
    doc.append_child(body, text);
    let index = index_node(&doc, &mut mirror, text);

    let config = retrace_config::AgentConfig {
        show_text: false,
        ..Default::default()
    };
    let state = build(
        &doc,
        &mirror,
        index,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &SnapshotPolicy::from_config(&config),
    )
    .unwrap();

    assert_eq!(
        state.layout,
        LayoutData::Text {
            content: "****** *****".to_string()
        }
    );
}

#[test]
fn hidden_images_drop_their_source() {
    let (mut doc, mut mirror) = setup();
    let body = doc.children(doc.root())[0];
    let img = doc.create_element("img");
    doc.set_attribute(img, "src", "https://cdn.test/a.png");
    doc.set_attribute(img, "alt", "portrait");
    doc.append_child(body, img);
    let index = index_node(&doc, &mut mirror, img);

    let config = retrace_config::AgentConfig {
        show_images: false,
        ..Default::default()
    };
    let state = build(
        &doc,
        &mirror,
        index,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &SnapshotPolicy::from_config(&config),
    )
    .unwrap();

    assert!(!state.attributes.contains_key("src"));
    assert!(state.attributes.contains_key("alt"));
}

#[test]
fn script_subtrees_are_ignored_but_keep_shape() {
    let (mut doc, mut mirror) = setup();
    let body = doc.children(doc.root())[0];
    let script = doc.create_element("script");
    doc.set_attribute(script, "src", "/app.js");
    doc.append_child(body, script);
    let inline = doc.create_text("alert(1)");
    doc.append_child(script, inline);
    let script_id = index_node(&doc, &mut mirror, script);
    let inline_id = index_node(&doc, &mut mirror, inline);

    let policy = SnapshotPolicy::default();
    let script_state = build(
        &doc,
        &mirror,
        script_id,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &policy,
    )
    .unwrap();
    let inline_state = build(
        &doc,
        &mirror,
        inline_id,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &policy,
    )
    .unwrap();

    assert_eq!(script_state.layout, LayoutData::Ignored);
    assert!(script_state.attributes.is_empty());
    assert_eq!(inline_state.layout, LayoutData::Ignored);
    assert_eq!(inline_state.parent, Some(script_id));
}

#[test]
fn vanished_nodes_yield_no_snapshot() {
    let (mut doc, mut mirror) = setup();
    let body = doc.children(doc.root())[0];
    let div = doc.create_element("div");
    doc.append_child(body, div);
    let index = index_node(&doc, &mut mirror, div);

    doc.collect(div);
    let state = build(
        &doc,
        &mirror,
        index,
        LayoutSource::Discover,
        LayoutAction::Insert,
        None,
        &SnapshotPolicy::default(),
    );
    assert!(state.is_none());
}

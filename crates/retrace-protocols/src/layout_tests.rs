use super::*;

fn sample_state() -> LayoutState {
    let mut attributes = BTreeMap::new();
    attributes.insert("id".to_string(), "a".to_string());
    LayoutState {
        index: 3,
        parent: Some(2),
        previous: None,
        next: Some(4),
        source: LayoutSource::Mutation,
        action: LayoutAction::Insert,
        tag: "div".to_string(),
        attributes,
        layout: LayoutData::Box {
            x: 0.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
            scroll: Some(ScrollPosition { x: 0.0, y: 5.0 }),
        },
        mutation_sequence: Some(7),
    }
}

#[test]
fn derive_restamps_source_and_action() {
    let state = sample_state();
    let next = state.derive(LayoutSource::Scroll, LayoutAction::Update);
    assert_eq!(next.source, LayoutSource::Scroll);
    assert_eq!(next.action, LayoutAction::Update);
    assert_eq!(next.index, state.index);
    assert_eq!(next.tag, state.tag);
    assert!(next.mutation_sequence.is_none());
}

#[test]
fn scroll_accessor_only_for_boxes() {
    let state = sample_state();
    assert_eq!(state.layout.scroll(), Some(ScrollPosition { x: 0.0, y: 5.0 }));
    let text = LayoutData::Text {
        content: "hi".to_string(),
    };
    assert!(text.scroll().is_none());
    assert!(LayoutData::Ignored.scroll().is_none());
}

#[test]
fn serialization_skips_empty_fields() {
    let mut state = sample_state();
    state.parent = None;
    state.attributes.clear();
    state.mutation_sequence = None;
    let json = serde_json::to_string(&state).unwrap();
    assert!(!json.contains("parent"));
    assert!(!json.contains("attributes"));
    assert!(!json.contains("mutation_sequence"));
}

#[test]
fn layout_state_round_trips_through_json() {
    let state = sample_state();
    let json = serde_json::to_string(&state).unwrap();
    let back: LayoutState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

#[test]
fn index_tree_len_counts_all_nodes() {
    let tree = IndexTree::with_children(
        0,
        vec![
            IndexTree::with_children(1, vec![IndexTree::leaf(2), IndexTree::leaf(3)]),
            IndexTree::leaf(4),
        ],
    );
    assert_eq!(tree.len(), 5);
}

#[test]
fn index_tree_equality_is_structural() {
    let a = IndexTree::with_children(0, vec![IndexTree::leaf(1), IndexTree::leaf(2)]);
    let b = IndexTree::with_children(0, vec![IndexTree::leaf(1), IndexTree::leaf(2)]);
    let c = IndexTree::with_children(0, vec![IndexTree::leaf(2), IndexTree::leaf(1)]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

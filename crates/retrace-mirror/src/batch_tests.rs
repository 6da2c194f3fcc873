use super::*;
use retrace_dom::Document;

/// Seed the mirror the way discovery does: every attached node indexed in
/// document order.
fn discover(mirror: &mut ShadowMirror, doc: &Document) {
    for node in doc.descendants(doc.root()) {
        if node == doc.root() {
            continue;
        }
        let live = doc.get(node).unwrap();
        let parent_id = mirror.index_of(live.parent().unwrap()).unwrap();
        mirror.insert_shadow_node(node, live.kind(), parent_id, None);
    }
}

fn page() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new("https://example.test/");
    let root = doc.root();
    let body = doc.create_element("body");
    let div = doc.create_element("div");
    doc.set_attribute(div, "id", "a");
    doc.append_child(root, body);
    doc.append_child(body, div);
    (doc, body, div)
}

#[test]
fn appended_node_classifies_as_new() {
    let (mut doc, _body, div) = page();
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    let span = doc.create_element("span");
    doc.append_child(div, span);

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert_eq!(summary.new_nodes, vec![span]);
    assert!(summary.moved_nodes.is_empty());
    assert!(summary.removed.is_empty());
    assert_eq!(mirror.index_of(span), Some(3));
    assert_eq!(
        mirror.position(3),
        (Some(mirror.index_of(div).unwrap()), None)
    );
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn inserted_subtree_is_indexed_depth_first() {
    let (mut doc, body, _div) = page();
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    let section = doc.create_element("section");
    let text = doc.create_text("hi");
    doc.append_child(section, text);
    doc.append_child(body, section);

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert_eq!(summary.new_nodes, vec![section, text]);
    let section_id = mirror.index_of(section).unwrap();
    let text_id = mirror.index_of(text).unwrap();
    assert_eq!(mirror.position(text_id), (Some(section_id), None));
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn attribute_change_classifies_as_updated() {
    let (mut doc, _body, div) = page();
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    doc.set_attribute(div, "title", "y");

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert_eq!(summary.updated_nodes, vec![div]);
    assert!(summary.new_nodes.is_empty());
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn text_change_classifies_as_updated() {
    let (mut doc, _body, div) = page();
    let text = doc.create_text("before");
    doc.append_child(div, text);
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    doc.set_text(text, "after");

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);
    assert_eq!(summary.updated_nodes, vec![text]);
}

#[test]
fn detached_subtree_classifies_as_removed() {
    let (mut doc, _body, div) = page();
    let text = doc.create_text("bye");
    doc.append_child(div, text);
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let div_id = mirror.index_of(div).unwrap();
    let observer = doc.observe();

    doc.remove_child(div);

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert_eq!(summary.removed, vec![div_id]);
    assert!(mirror.index_of(div).is_none());
    assert!(mirror.index_of(text).is_none());
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn reattached_node_classifies_as_moved() {
    let (mut doc, body, div) = page();
    let aside = doc.create_element("aside");
    doc.append_child(body, aside);
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let div_id = mirror.index_of(div).unwrap();
    let aside_id = mirror.index_of(aside).unwrap();
    let observer = doc.observe();

    doc.remove_child(div);
    doc.append_child(aside, div);

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert_eq!(summary.moved_nodes, vec![div]);
    assert!(summary.removed.is_empty());
    // Index survives the move.
    assert_eq!(mirror.index_of(div), Some(div_id));
    assert_eq!(mirror.position(div_id), (Some(aside_id), None));
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn remove_and_reinsert_in_place_reports_nothing() {
    let (mut doc, body, div) = page();
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    doc.remove_child(div);
    doc.append_child(body, div);

    let records = doc.take_records(observer);
    assert_eq!(records.len(), 2);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert!(summary.is_empty());
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn insert_then_remove_within_a_batch_reports_nothing() {
    let (mut doc, _body, div) = page();
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    let flash = doc.create_element("span");
    doc.append_child(div, flash);
    doc.remove_child(flash);

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    // The node never reached a terminal attached state.
    assert!(summary.is_empty());
    assert!(mirror.index_of(flash).is_none());
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn removal_wins_over_update_within_a_batch() {
    let (mut doc, _body, div) = page();
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let div_id = mirror.index_of(div).unwrap();
    let observer = doc.observe();

    doc.set_attribute(div, "title", "gone");
    doc.remove_child(div);

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert!(summary.updated_nodes.is_empty());
    assert_eq!(summary.removed, vec![div_id]);
}

#[test]
fn reorder_within_parent_classifies_as_moved() {
    let (mut doc, body, div) = page();
    let aside = doc.create_element("aside");
    doc.append_child(body, aside);
    let mut mirror = ShadowMirror::new(doc.root());
    discover(&mut mirror, &doc);
    let observer = doc.observe();

    // [div, aside] -> [aside, div]
    doc.insert_before(body, aside, Some(div));

    let records = doc.take_records(observer);
    let summary = mirror.apply_mutation_batch(&doc, &records);

    assert_eq!(summary.moved_nodes, vec![aside]);
    assert!(mirror.is_consistent(&doc));
}

#[test]
fn batch_application_matches_sequential_application() {
    // Applying the batch atomically must land on the same shadow state as
    // applying each record as its own batch.
    let build = |doc: &mut Document| {
        let root = doc.root();
        let body = doc.create_element("body");
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(root, body);
        doc.append_child(body, a);
        doc.append_child(body, b);
        (body, a, b)
    };

    let mut doc_atomic = Document::new("https://example.test/");
    let (body, a, b) = build(&mut doc_atomic);
    let mut atomic = ShadowMirror::new(doc_atomic.root());
    discover(&mut atomic, &doc_atomic);
    let observer = doc_atomic.observe();

    let mut doc_steps = Document::new("https://example.test/");
    let (body2, a2, b2) = build(&mut doc_steps);
    let mut stepped = ShadowMirror::new(doc_steps.root());
    discover(&mut stepped, &doc_steps);
    let observer2 = doc_steps.observe();

    // Same mutations on both documents.
    let span = doc_atomic.create_element("span");
    doc_atomic.append_child(a, span);
    doc_atomic.insert_before(body, b, Some(a));
    doc_atomic.set_attribute(b, "class", "x");

    let span2 = doc_steps.create_element("span");
    doc_steps.append_child(a2, span2);
    doc_steps.insert_before(body2, b2, Some(a2));
    doc_steps.set_attribute(b2, "class", "x");

    let records = doc_atomic.take_records(observer);
    atomic.apply_mutation_batch(&doc_atomic, &records);

    for record in doc_steps.take_records(observer2) {
        stepped.apply_mutation_batch(&doc_steps, &[record]);
    }

    assert!(atomic.is_consistent(&doc_atomic));
    assert!(stepped.is_consistent(&doc_steps));
    assert_eq!(atomic.shadow_index_tree(), stepped.shadow_index_tree());
}

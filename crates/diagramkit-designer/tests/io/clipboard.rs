use std::collections::HashSet;
use std::sync::Arc;

use diagramkit_core::{EventBus, Point};
use diagramkit_designer::{
    ClipboardEngine, ClipboardPayload, Document, EdgeOverrides, NodeOverrides, NodePatch,
    ShapeRegistry,
};

fn document() -> Document {
    Document::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()))
}

#[test]
fn test_paste_connected_pair_with_offset() {
    let mut doc = document();
    let a = doc.create_node("rect", 40.0, 60.0, NodeOverrides::new()).unwrap();
    let b = doc.create_node("rect", 240.0, 60.0, NodeOverrides::new()).unwrap();
    doc.create_edge(&a.id, &b.id, EdgeOverrides::new()).unwrap();
    let existing: HashSet<_> = doc.nodes().map(|n| n.id.clone()).collect();

    let payload = ClipboardPayload::capture(&doc, &[a.id.clone(), b.id.clone()]);
    assert_eq!(payload.edges.len(), 1);
    let result = payload.paste(&mut doc, Point::new(20.0, 20.0)).unwrap();

    let new_ids: HashSet<_> = result.new_node_ids.iter().cloned().collect();
    assert!(new_ids.is_disjoint(&existing));

    let edge = doc.edge(&result.new_edge_ids[0]).unwrap();
    assert!(new_ids.contains(&edge.source_id));
    assert!(new_ids.contains(&edge.target_id));

    for (original, pasted_id) in [&a, &b].iter().zip(&result.new_node_ids) {
        let pasted = doc.node(pasted_id).unwrap();
        assert_eq!((pasted.x, pasted.y), (original.x + 20.0, original.y + 20.0));
    }
}

#[test]
fn test_pasted_copy_is_independent() {
    let mut doc = document();
    let a = doc
        .create_node("process", 0.0, 0.0, NodeOverrides::new().with_label("Original"))
        .unwrap();
    doc.select_node(&a.id, false).unwrap();

    let mut clipboard = ClipboardEngine::new();
    clipboard.copy(&doc);
    let result = clipboard.paste(&mut doc).unwrap().unwrap();

    doc.update_node(&result.new_node_ids[0], &NodePatch::label("Copy"))
        .unwrap();
    assert_eq!(doc.node(&a.id).unwrap().label, "Original");
    assert_eq!(clipboard.payload().unwrap().nodes[0].label, "Original");
}

#[test]
fn test_pasting_twice_gives_distinct_ids() {
    let mut doc = document();
    let a = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let payload = ClipboardPayload::capture(&doc, &[a.id.clone()]);

    let first = payload.paste(&mut doc, Point::new(20.0, 20.0)).unwrap();
    let second = payload.paste(&mut doc, Point::new(20.0, 20.0)).unwrap();
    assert_ne!(first.new_node_ids, second.new_node_ids);
    assert_eq!(doc.node_count(), 3);
}

#[test]
fn test_payload_serializes() {
    let mut doc = document();
    let a = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let payload = ClipboardPayload::capture(&doc, &[a.id.clone()]);

    let json = serde_json::to_string(&payload).unwrap();
    let back: ClipboardPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back, payload);
}

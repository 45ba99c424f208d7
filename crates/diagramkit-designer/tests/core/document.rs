use std::sync::Arc;

use diagramkit_core::{DiagramError, EventBus};
use diagramkit_designer::{Document, EdgeOverrides, NodeOverrides, NodePatch, ShapeRegistry};
use proptest::prelude::*;

fn document() -> Document {
    Document::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()))
}

#[test]
fn test_start_end_flow_has_no_cycles() {
    let mut doc = document();
    let start = doc
        .create_node("rect", 100.0, 50.0, NodeOverrides::new().with_label("Start"))
        .unwrap();
    let end = doc
        .create_node("rect", 100.0, 150.0, NodeOverrides::new().with_label("End"))
        .unwrap();
    doc.create_edge(&start.id, &end.id, EdgeOverrides::new())
        .unwrap();

    assert_eq!(doc.edges_for_node(&start.id).len(), 1);
    assert!(doc.detect_cycles().is_empty());
}

#[test]
fn test_triangle_cycle_is_detected() {
    let mut doc = document();
    let a = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let b = doc.create_node("rect", 200.0, 0.0, NodeOverrides::new()).unwrap();
    let c = doc.create_node("rect", 100.0, 200.0, NodeOverrides::new()).unwrap();
    doc.create_edge(&a.id, &b.id, EdgeOverrides::new()).unwrap();
    doc.create_edge(&b.id, &c.id, EdgeOverrides::new()).unwrap();
    doc.create_edge(&c.id, &a.id, EdgeOverrides::new()).unwrap();

    let cycles = doc.detect_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0],
        vec![a.id.clone(), b.id.clone(), c.id.clone(), a.id.clone()]
    );
}

#[test]
fn test_negative_width_is_rejected_without_change() {
    let mut doc = document();
    let node = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();

    let err = doc
        .update_node(&node.id, &NodePatch::new().with_width(-5.0))
        .unwrap_err();
    assert!(matches!(err, DiagramError::InvalidGeometry { .. }));
    assert_eq!(doc.node(&node.id), Some(&node));
}

#[test]
fn test_non_finite_geometry_is_rejected() {
    let mut doc = document();
    let err = doc
        .create_node("rect", f64::NAN, 0.0, NodeOverrides::new())
        .unwrap_err();
    assert!(err.is_invalid_geometry());
    assert!(doc.is_empty());

    let node = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let err = doc
        .update_node(&node.id, &NodePatch::new().with_width(f64::INFINITY))
        .unwrap_err();
    assert!(err.is_invalid_geometry());
    assert_eq!(doc.node(&node.id), Some(&node));
}

#[test]
fn test_unknown_shape_type_never_falls_back() {
    let mut doc = document();
    let err = doc
        .create_node("hexagon", 0.0, 0.0, NodeOverrides::new())
        .unwrap_err();
    assert!(matches!(err, DiagramError::UnknownShapeType { .. }));
    assert!(doc.is_empty());
}

#[test]
fn test_edge_to_missing_node_is_not_found() {
    let mut doc = document();
    let a = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let err = doc
        .create_edge(&a.id, &"ghost".into(), EdgeOverrides::new())
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(doc.edge_count(), 0);
}

#[test]
fn test_removing_missing_ids_is_idempotent() {
    let mut doc = document();
    assert!(doc.remove_node(&"ghost".into()).is_none());
    assert!(doc.remove_edge(&"ghost".into()).is_none());
}

proptest! {
    #[test]
    fn prop_cascade_delete_leaves_no_dangling_edges(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..20),
        victim in 0usize..6,
    ) {
        let mut doc = document();
        let ids: Vec<_> = (0..6)
            .map(|i| {
                doc.create_node("rect", i as f64 * 150.0, 0.0, NodeOverrides::new())
                    .unwrap()
                    .id
            })
            .collect();
        for (s, t) in edges {
            doc.create_edge(&ids[s], &ids[t], EdgeOverrides::new()).unwrap();
        }

        doc.remove_node(&ids[victim]);

        prop_assert!(doc.edges_for_node(&ids[victim]).is_empty());
        prop_assert!(doc.edges().all(|e| !e.touches(&ids[victim])));
        for id in ids.iter().filter(|id| *id != &ids[victim]) {
            for edge in doc.edges_for_node(id) {
                prop_assert!(doc.contains_node(&edge.source_id));
                prop_assert!(doc.contains_node(&edge.target_id));
            }
        }
    }
}

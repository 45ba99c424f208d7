use std::sync::Arc;

use diagramkit_core::{DiagramError, EventBus};
use diagramkit_designer::serialization::from_json_str;
use diagramkit_designer::{
    deserialize, serialize, DiagramFile, DiagramMetadata, Document, EdgeOverrides, NodeOverrides,
    NodePatch, Port, RoutingType, ShapeRegistry, Side, ViewportState,
};
use proptest::prelude::*;
use serde_json::json;

fn registry() -> Arc<ShapeRegistry> {
    Arc::new(ShapeRegistry::builtin())
}

#[test]
fn test_file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow.json");

    let mut doc = Document::new(registry(), Arc::new(EventBus::new()));
    let a = doc
        .create_node("terminator", 0.0, 0.0, NodeOverrides::new().with_label("Start"))
        .unwrap();
    let b = doc
        .create_node("decision", 0.0, 150.0, NodeOverrides::new().with_label("Ok?"))
        .unwrap();
    doc.create_edge(
        &a.id,
        &b.id,
        EdgeOverrides::new()
            .with_ports(Some("bottom"), Some("top"))
            .with_routing(RoutingType::Orthogonal),
    )
    .unwrap();

    let file = DiagramFile::from_document(
        &doc,
        ViewportState::default(),
        Some(DiagramMetadata::new("Flow")),
    );
    file.save_to_file(&path).unwrap();

    let loaded = DiagramFile::load_from_file(&path).unwrap();
    assert_eq!(loaded, file);

    let rebuilt = loaded
        .to_document(registry(), Arc::new(EventBus::new()))
        .unwrap();
    assert_eq!(rebuilt.node(&a.id), doc.node(&a.id));
    assert_eq!(rebuilt.edges_for_node(&b.id).len(), 1);
}

#[test]
fn test_load_garbage_reports_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"version\": \"1.0\"").unwrap();

    let err = DiagramFile::load_from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.json"));
}

#[test]
fn test_load_dangling_edge_stays_malformed_under_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.json");
    let body = json!({
        "version": "1.0",
        "nodes": [],
        "edges": [{"id": "e1", "sourceId": "a", "targetId": "b"}]
    });
    std::fs::write(&path, body.to_string()).unwrap();

    let err = DiagramFile::load_from_file(&path).unwrap_err();
    assert!(err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<DiagramError>())
        .any(DiagramError::is_malformed));
}

#[test]
fn test_port_reference_must_exist() {
    let payload = json!({
        "version": "1.0",
        "nodes": [
            {"id": "t", "type": "terminator", "x": 0, "y": 0, "width": 120, "height": 50,
             "ports": [{"id": "top", "side": "top", "offset": 0.5}]},
            {"id": "r", "type": "rect", "x": 0, "y": 100, "width": 120, "height": 50}
        ],
        "edges": [{"id": "e", "sourceId": "t", "targetId": "r", "sourcePortId": "left"}]
    });
    let err = deserialize(payload).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_saved_document_stays_loadable_after_port_edits() {
    let mut doc = Document::new(registry(), Arc::new(EventBus::new()));
    let a = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let b = doc.create_node("rect", 300.0, 0.0, NodeOverrides::new()).unwrap();
    doc.create_edge(
        &a.id,
        &b.id,
        EdgeOverrides::new().with_ports(Some("right"), Some("left")),
    )
    .unwrap();

    let err = doc
        .update_node(&a.id, &NodePatch::new().with_ports(Vec::new()))
        .unwrap_err();
    assert!(err.is_not_found());

    let kept = vec![Port::new("right", Side::Right, 0.5)];
    doc.update_node(&a.id, &NodePatch::new().with_ports(kept))
        .unwrap();

    let value = serialize(&doc, ViewportState::default(), None).unwrap();
    let file = deserialize(value).unwrap();
    assert_eq!(file.nodes[0].ports.len(), 1);
    assert_eq!(file.edges[0].source_port_id.as_deref(), Some("right"));
}

#[test]
fn test_json_text_entry_point() {
    let text = r#"{"version": "1.0", "nodes": [], "edges": [], "viewport": {"panX": 1, "panY": 2, "zoom": 0.5}}"#;
    let file = from_json_str(text).unwrap();
    assert_eq!(
        file.viewport,
        ViewportState {
            pan_x: 1.0,
            pan_y: 2.0,
            zoom: 0.5
        }
    );
}

#[derive(Debug, Clone)]
struct NodeSpec {
    shape: &'static str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    label: String,
}

fn node_spec() -> impl Strategy<Value = NodeSpec> {
    (
        prop::sample::select(vec!["rect", "circle", "diamond", "process", "decision"]),
        -1e4..1e4f64,
        -1e4..1e4f64,
        0.5..500.0f64,
        0.5..500.0f64,
        "\\PC{0,12}",
    )
        .prop_map(|(shape, x, y, width, height, label)| NodeSpec {
            shape,
            x,
            y,
            width,
            height,
            label,
        })
}

fn routing() -> impl Strategy<Value = RoutingType> {
    prop_oneof![
        Just(RoutingType::Straight),
        Just(RoutingType::Bezier),
        Just(RoutingType::Orthogonal),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_serialize_deserialize_round_trip(
        specs in prop::collection::vec(node_spec(), 1..10),
        links in prop::collection::vec((0usize..10, 0usize..10, routing()), 0..15),
        pan_x in -1e3..1e3f64,
        pan_y in -1e3..1e3f64,
        zoom in 0.1..5.0f64,
    ) {
        let mut doc = Document::new(registry(), Arc::new(EventBus::new()));
        let ids: Vec<_> = specs
            .iter()
            .map(|s| {
                doc.create_node(
                    s.shape,
                    s.x,
                    s.y,
                    NodeOverrides::new()
                        .with_size(s.width, s.height)
                        .with_label(s.label.clone()),
                )
                .unwrap()
                .id
            })
            .collect();
        for (s, t, routing) in links {
            doc.create_edge(
                &ids[s % ids.len()],
                &ids[t % ids.len()],
                EdgeOverrides::new().with_routing(routing),
            )
            .unwrap();
        }
        let viewport = ViewportState { pan_x, pan_y, zoom };

        let value = serialize(&doc, viewport, None).unwrap();
        let text = serde_json::to_string(&value).unwrap();
        let file = from_json_str(&text).unwrap();

        prop_assert_eq!(file.nodes, doc.nodes().cloned().collect::<Vec<_>>());
        prop_assert_eq!(file.edges, doc.edges().cloned().collect::<Vec<_>>());
        prop_assert_eq!(file.viewport, viewport);
    }
}

use std::sync::Arc;

use diagramkit_core::{DiagramError, EventBus, Point};
use diagramkit_designer::{
    DesignerState, DropTarget, EdgeOverrides, NodeOverrides, ResizeHandle, ShapeRegistry,
};
use diagramkit_settings::EditorConfig;

fn state() -> DesignerState {
    DesignerState::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()))
}

#[test]
fn test_build_edit_save_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("process.json");

    let mut editor = state();
    let start = editor
        .create_node("terminator", 100.0, 0.0, NodeOverrides::new().with_label("Start"))
        .unwrap();
    let check = editor
        .create_node("decision", 100.0, 120.0, NodeOverrides::new().with_label("Valid?"))
        .unwrap();
    let done = editor
        .create_node("terminator", 100.0, 260.0, NodeOverrides::new().with_label("Done"))
        .unwrap();
    editor
        .connect(
            &start.id,
            &check.id,
            EdgeOverrides::new().with_ports(Some("bottom"), Some("top")),
        )
        .unwrap();
    editor
        .connect(
            &check.id,
            &done.id,
            EdgeOverrides::new()
                .with_ports(Some("bottom"), Some("top"))
                .with_label("yes"),
        )
        .unwrap();

    editor.begin_drag(&[check.id.clone()], Point::new(150.0, 150.0)).unwrap();
    editor.drag_to(Point::new(163.0, 150.0)).unwrap();
    editor.end_interaction().unwrap();
    editor.save_to_file(&path).unwrap();

    let mut reopened = state();
    reopened.load_from_file(&path).unwrap();
    let original: Vec<_> = editor.document().nodes().cloned().collect();
    let loaded: Vec<_> = reopened.document().nodes().cloned().collect();
    assert_eq!(loaded, original);
    assert_eq!(reopened.document().edge_count(), 2);
    assert!(reopened.document().detect_cycles().is_empty());
    assert!(!reopened.can_undo());
}

#[test]
fn test_terminator_rejects_side_ports() {
    let mut state = state();
    let a = state
        .create_node("terminator", 0.0, 0.0, NodeOverrides::new())
        .unwrap();
    let b = state
        .create_node("rect", 300.0, 0.0, NodeOverrides::new())
        .unwrap();
    let err = state
        .connect(&a.id, &b.id, EdgeOverrides::new().with_ports(Some("right"), None))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(state.document().edge_count(), 0);
}

#[test]
fn test_duplicate_connection_gesture_is_rejected() {
    let mut state = state();
    let a = state
        .create_node("rect", 0.0, 0.0, NodeOverrides::new())
        .unwrap();
    let b = state
        .create_node("rect", 300.0, 0.0, NodeOverrides::new())
        .unwrap();
    let drop = DropTarget::Port {
        node_id: b.id.clone(),
        port_id: "left".to_string(),
    };

    state.begin_connection(&a.id, Some("right")).unwrap();
    state.finish_connection(&drop, Point::new(300.0, 30.0)).unwrap();

    state.begin_connection(&a.id, Some("right")).unwrap();
    let err = state
        .finish_connection(&drop, Point::new(300.0, 30.0))
        .unwrap_err();
    assert!(matches!(err, DiagramError::ConnectionRejected { .. }));
    assert_eq!(state.document().edge_count(), 1);
}

#[test]
fn test_resize_respects_configured_minimum() {
    let mut config = EditorConfig::default();
    config.interaction.min_node_width = 80.0;
    config.interaction.min_node_height = 40.0;
    config.snap.enabled = false;
    let mut state = DesignerState::with_config(
        Arc::new(ShapeRegistry::builtin()),
        Arc::new(EventBus::new()),
        config,
    );
    let node = state
        .create_node("rect", 0.0, 0.0, NodeOverrides::new().with_size(120.0, 60.0))
        .unwrap();

    state
        .begin_resize(&node.id, ResizeHandle::SE, Point::new(120.0, 60.0))
        .unwrap();
    state.resize_to(Point::new(10.0, 10.0), false).unwrap();
    state.end_interaction().unwrap();

    let resized = state.document().node(&node.id).unwrap();
    assert_eq!((resized.width, resized.height), (80.0, 40.0));
    state.undo().unwrap();
    assert_eq!(state.document().node(&node.id), Some(&node));
}

#[test]
fn test_zoom_to_fit_shows_everything() {
    let mut state = state();
    state
        .create_node("rect", -400.0, -300.0, NodeOverrides::new())
        .unwrap();
    state
        .create_node("rect", 900.0, 700.0, NodeOverrides::new())
        .unwrap();

    assert!(state.zoom_to_fit());
    let bounds = state.document().bounds().unwrap();
    assert!(state.viewport.visible_rect().contains_rect(&bounds));
}

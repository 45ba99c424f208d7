use std::sync::Arc;

use diagramkit_core::constants::{MAX_ZOOM, MIN_ZOOM};
use diagramkit_core::{EventBus, Point, Rect};
use diagramkit_designer::ViewportTransform;
use proptest::prelude::*;

#[test]
fn test_zoom_is_clamped() {
    let mut viewport = ViewportTransform::new(Arc::new(EventBus::new()));
    viewport.set_zoom(100.0);
    assert_eq!(viewport.zoom(), MAX_ZOOM);
    viewport.set_zoom(0.0);
    assert_eq!(viewport.zoom(), MIN_ZOOM);
}

#[test]
fn test_zoom_at_keeps_cursor_point() {
    let mut viewport = ViewportTransform::new(Arc::new(EventBus::new()));
    viewport.set_pan(40.0, -20.0);
    let cursor = Point::new(300.0, 200.0);
    let under_cursor = viewport.screen_to_document(cursor);

    viewport.zoom_in_at(cursor);
    let after = viewport.document_to_screen(under_cursor);
    assert!((after.x - cursor.x).abs() < 1e-9);
    assert!((after.y - cursor.y).abs() < 1e-9);
}

#[test]
fn test_fit_to_bounds_centers_content() {
    let mut viewport = ViewportTransform::new(Arc::new(EventBus::new()));
    viewport.set_canvas_size(1000.0, 500.0);
    let bounds = Rect::new(100.0, 100.0, 400.0, 100.0);
    viewport.fit_to_bounds(&bounds, 0.0);

    assert_eq!(viewport.zoom(), 2.5);
    let center = viewport.document_to_screen(bounds.center());
    assert_eq!(center, Point::new(500.0, 250.0));

    let visible = viewport.visible_rect();
    assert!(visible.contains_rect(&bounds));
}

#[test]
fn test_changes_are_announced_once() {
    let events = EventBus::recording();
    let mut viewport = ViewportTransform::new(events.clone());
    viewport.pan_by(10.0, 0.0);
    viewport.set_pan(10.0, 0.0);
    viewport.set_zoom(1.0);
    assert_eq!(events.history_names(), vec!["viewport:changed"]);
}

proptest! {
    #[test]
    fn prop_screen_document_round_trip(
        zoom in 0.1..5.0f64,
        pan_x in -1000.0..1000.0f64,
        pan_y in -1000.0..1000.0f64,
        x in -5000.0..5000.0f64,
        y in -5000.0..5000.0f64,
    ) {
        let mut viewport = ViewportTransform::new(Arc::new(EventBus::new()));
        viewport.set_zoom(zoom);
        viewport.set_pan(pan_x, pan_y);

        let point = Point::new(x, y);
        let back = viewport.screen_to_document(viewport.document_to_screen(point));
        prop_assert!((back.x - x).abs() < 1e-6);
        prop_assert!((back.y - y).abs() < 1e-6);
    }
}

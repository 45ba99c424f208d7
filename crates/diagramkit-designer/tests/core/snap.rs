use std::sync::Arc;

use diagramkit_core::{EventBus, Point, Rect};
use diagramkit_designer::{snap_to_grid, snap_to_neighbors, Document, NodeOverrides, ShapeRegistry, SnapEngine};
use diagramkit_settings::{NeighborPolicy, SnapSettings};
use proptest::prelude::*;

#[test]
fn test_grid_snap_example() {
    assert_eq!(snap_to_grid(17.0, 33.0, 20.0), Point::new(20.0, 40.0));
}

#[test]
fn test_neighbor_policies_disagree_on_ties() {
    let moving = Rect::new(103.0, 0.0, 50.0, 50.0);
    let near = Rect::new(101.0, 300.0, 80.0, 80.0);
    let far = Rect::new(108.0, 600.0, 80.0, 80.0);

    let last = snap_to_neighbors(&moving, [&near, &far], 10.0, NeighborPolicy::LastMatch);
    assert_eq!(last.x, 108.0);

    let closest = snap_to_neighbors(&moving, [&near, &far], 10.0, NeighborPolicy::Closest);
    assert_eq!(closest.x, 101.0);
}

#[test]
fn test_engine_snaps_grid_then_neighbors() {
    let mut doc = Document::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()));
    let anchor = doc
        .create_node("rect", 205.0, 0.0, NodeOverrides::new().with_size(100.0, 50.0))
        .unwrap();
    let moving = doc
        .create_node("rect", 0.0, 300.0, NodeOverrides::new().with_size(100.0, 50.0))
        .unwrap();

    let engine = SnapEngine::new();
    let snapped = engine.snap_position(&moving, 198.0, 301.0, doc.nodes());
    // Grid gives (200, 300); the anchor's left edge is 5 away on x.
    assert_eq!(snapped, Point::new(205.0, 300.0));
}

#[test]
fn test_disabled_engine_is_identity() {
    let settings = SnapSettings {
        enabled: false,
        ..SnapSettings::default()
    };
    let engine = SnapEngine::from_settings(&settings);
    assert_eq!(engine.snap_to_grid(17.0, 33.0), Point::new(17.0, 33.0));
    assert_eq!(engine.snap_size(17.0, 33.0), (17.0, 33.0));
}

proptest! {
    #[test]
    fn prop_grid_snap_lands_on_grid(x in -10_000.0..10_000.0f64, y in -10_000.0..10_000.0f64, grid in 1u32..100) {
        let grid = grid as f64;
        let p = snap_to_grid(x, y, grid);
        prop_assert!((p.x / grid - (p.x / grid).round()).abs() < 1e-9);
        prop_assert!((p.y / grid - (p.y / grid).round()).abs() < 1e-9);
        prop_assert!((p.x - x).abs() <= grid / 2.0 + 1e-9);
        prop_assert!((p.y - y).abs() <= grid / 2.0 + 1e-9);
    }
}

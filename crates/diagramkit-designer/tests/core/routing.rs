use std::sync::Arc;

use diagramkit_core::{EventBus, Point};
use diagramkit_designer::{
    ConnectionRouter, Document, DropTarget, EdgeOverrides, Node, NodeOverrides, RoutingType,
    ShapeRegistry, Side,
};
use proptest::prelude::*;

fn document() -> Document {
    Document::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()))
}

fn square(doc: &mut Document, x: f64, y: f64) -> Node {
    doc.create_node("rect", x, y, NodeOverrides::new().with_size(100.0, 100.0))
        .unwrap()
}

#[test]
fn test_equidistant_points_prefer_earlier_side() {
    let mut doc = document();
    let node = square(&mut doc, 0.0, 0.0);
    let router = ConnectionRouter::new();

    assert_eq!(router.nearest_port(&node, Point::new(100.0, 0.0)).side, Side::Top);
    assert_eq!(router.nearest_port(&node, Point::new(100.0, 100.0)).side, Side::Right);
    assert_eq!(router.nearest_port(&node, Point::new(0.0, 100.0)).side, Side::Bottom);
    assert_eq!(router.nearest_port(&node, Point::new(0.0, 0.0)).side, Side::Top);
}

#[test]
fn test_routing_styles() {
    let mut doc = document();
    let a = square(&mut doc, 0.0, 0.0);
    let b = square(&mut doc, 300.0, 200.0);
    let router = ConnectionRouter::new();

    let straight = router.compute_path(&a, &b, None, None, RoutingType::Straight);
    assert_eq!(straight.points, vec![a.center(), b.center()]);

    let bezier = router.compute_path(&a, &b, Some("right"), Some("left"), RoutingType::Bezier);
    assert_eq!(
        bezier.points,
        vec![
            Point::new(100.0, 50.0),
            Point::new(200.0, 50.0),
            Point::new(200.0, 250.0),
            Point::new(300.0, 250.0),
        ]
    );
    assert!(bezier.to_svg_path().starts_with("M 100,50 C"));
}

#[test]
fn test_coincident_nodes_give_zero_length_path() {
    let mut doc = document();
    let a = square(&mut doc, 0.0, 0.0);
    let b = square(&mut doc, 0.0, 0.0);
    let path = ConnectionRouter::new().compute_path(&a, &b, None, None, RoutingType::Straight);
    assert_eq!(path.start(), path.end());
}

#[test]
fn test_route_follows_moved_node() {
    let mut doc = document();
    let a = square(&mut doc, 0.0, 0.0);
    let b = square(&mut doc, 300.0, 0.0);
    let edge = doc
        .create_edge(&a.id, &b.id, EdgeOverrides::new().with_ports(Some("right"), Some("left")))
        .unwrap();
    let router = ConnectionRouter::new();

    doc.set_node_position(&b.id, 300.0, 400.0).unwrap();
    let path = router.route_edge(&doc, &edge).unwrap();
    assert_eq!(path.end(), Some(Point::new(300.0, 450.0)));
}

#[test]
fn test_drop_resolution() {
    let mut doc = document();
    let a = square(&mut doc, 0.0, 0.0);
    let b = square(&mut doc, 300.0, 0.0);
    let router = ConnectionRouter::new();

    let body = DropTarget::NodeBody { node_id: b.id.clone() };
    assert_eq!(
        router.resolve_drop(&doc, &a.id, &body, Point::new(350.0, 95.0)),
        Some((b.id.clone(), Some("bottom".to_string())))
    );
    let own = DropTarget::NodeBody { node_id: a.id.clone() };
    assert!(router.resolve_drop(&doc, &a.id, &own, Point::new(50.0, 50.0)).is_none());
    assert!(router
        .resolve_drop(&doc, &a.id, &DropTarget::Empty, Point::new(900.0, 900.0))
        .is_none());
}

proptest! {
    #[test]
    fn prop_nearest_port_is_never_farther_than_any_side(x in -300.0..400.0f64, y in -300.0..400.0f64) {
        let mut doc = document();
        let node = square(&mut doc, 0.0, 0.0);
        let point = Point::new(x, y);
        let nearest = ConnectionRouter::new().nearest_port(&node, point);

        let best = nearest.point.distance_to(point);
        for side in Side::ALL {
            prop_assert!(best <= side.point_on(&node.bounds(), 0.5).distance_to(point));
        }
    }
}

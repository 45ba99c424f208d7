//! Edge geometry and port resolution.
//!
//! Nothing in here is cached: port positions are recomputed from the
//! current node bounds on every call, so results stay correct while nodes
//! are dragged or resized. All functions are total; degenerate geometry
//! (coincident nodes, zero-length segments) yields degenerate paths rather
//! than errors.

use std::fmt::Write as _;

use diagramkit_core::constants::{DEFAULT_MAGNETIC_RADIUS, DEFAULT_PULL_STRENGTH};
use diagramkit_core::geometry::{lerp_point, midpoint};
use diagramkit_core::{NodeId, Point};
use diagramkit_settings::RoutingSettings;

use crate::document::Document;
use crate::model::{Edge, Node, RoutingType, Side};

/// Closest mid-side point of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestPort {
    pub point: Point,
    pub side: Side,
    /// Declared port sitting at that mid-side point, if the node has one.
    pub port_id: Option<String>,
}

/// A port on some node, with its current position.
#[derive(Debug, Clone, PartialEq)]
pub struct PortRef {
    pub node_id: NodeId,
    pub port_id: String,
    pub position: Point,
}

/// Where a dragged connection was released.
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// Exactly on a port.
    Port { node_id: NodeId, port_id: String },
    /// On a node, away from its ports.
    NodeBody { node_id: NodeId },
    /// On empty canvas.
    Empty,
}

/// Magnetised endpoint of an in-progress connection drag.
#[derive(Debug, Clone, PartialEq)]
pub struct MagneticPreview {
    /// Where to draw the temporary endpoint.
    pub point: Point,
    /// The port pulling the endpoint, if any is within the radius.
    pub candidate: Option<PortRef>,
}

/// Computed geometry of one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub routing: RoutingType,
    /// Straight: `[start, end]`. Bezier: `[start, control1, control2, end]`.
    /// Orthogonal: the four corners of the elbow polyline.
    pub points: Vec<Point>,
}

impl RoutedPath {
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Point at which to anchor the edge label.
    pub fn label_anchor(&self) -> Option<Point> {
        match self.points.as_slice() {
            [a, b] => Some(midpoint(*a, *b)),
            [_, c1, c2, _] => Some(midpoint(*c1, *c2)),
            _ => None,
        }
    }

    /// SVG path data (`d` attribute) for this route.
    pub fn to_svg_path(&self) -> String {
        let mut d = String::new();
        let Some((first, rest)) = self.points.split_first() else {
            return d;
        };
        let _ = write!(d, "M {},{}", first.x, first.y);
        match (self.routing, rest) {
            (RoutingType::Bezier, [c1, c2, end]) => {
                let _ = write!(
                    d,
                    " C {},{} {},{} {},{}",
                    c1.x, c1.y, c2.x, c2.y, end.x, end.y
                );
            }
            _ => {
                for p in rest {
                    let _ = write!(d, " L {},{}", p.x, p.y);
                }
            }
        }
        d
    }
}

/// Resolves edge endpoints and computes their geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRouter {
    pub magnetic_radius: f64,
    pub pull_strength: f64,
}

impl Default for ConnectionRouter {
    fn default() -> Self {
        Self {
            magnetic_radius: DEFAULT_MAGNETIC_RADIUS,
            pull_strength: DEFAULT_PULL_STRENGTH,
        }
    }
}

impl ConnectionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &RoutingSettings) -> Self {
        Self {
            magnetic_radius: settings.magnetic_radius,
            pull_strength: settings.pull_strength,
        }
    }

    /// The mid-side point of `node` closest to `point`.
    ///
    /// Sides are evaluated in top, right, bottom, left order and only a
    /// strictly smaller distance replaces the current best, so ties go to
    /// the earlier side.
    pub fn nearest_port(&self, node: &Node, point: Point) -> NearestPort {
        let bounds = node.bounds();
        let mut best_side = Side::Top;
        let mut best_point = Side::Top.point_on(&bounds, 0.5);
        let mut best_distance = best_point.distance_to(point);

        for side in &Side::ALL[1..] {
            let candidate = side.point_on(&bounds, 0.5);
            let distance = candidate.distance_to(point);
            if distance < best_distance {
                best_side = *side;
                best_point = candidate;
                best_distance = distance;
            }
        }

        let port_id = node
            .ports
            .iter()
            .find(|p| p.side == best_side && p.offset == 0.5)
            .map(|p| p.id.clone());

        NearestPort {
            point: best_point,
            side: best_side,
            port_id,
        }
    }

    fn endpoint(
        &self,
        node: &Node,
        port_id: Option<&str>,
        other: &Node,
        routing: RoutingType,
    ) -> Point {
        if let Some(position) = port_id.and_then(|id| node.port_position(id)) {
            return position;
        }
        if port_id.is_none() && routing == RoutingType::Straight {
            return node.center();
        }
        self.nearest_port(node, other.center()).point
    }

    /// Geometry of an edge between `source` and `target`.
    ///
    /// A declared port id is used as-is. Without one, straight edges run
    /// center to center while bezier and orthogonal edges attach to the
    /// nearest mid-side point facing the other node's center. An id the
    /// node does not declare falls back to the nearest mid-side point.
    pub fn compute_path(
        &self,
        source: &Node,
        target: &Node,
        source_port: Option<&str>,
        target_port: Option<&str>,
        routing: RoutingType,
    ) -> RoutedPath {
        let start = self.endpoint(source, source_port, target, routing);
        let end = self.endpoint(target, target_port, source, routing);

        let points = match routing {
            RoutingType::Straight => vec![start, end],
            RoutingType::Bezier => {
                // Controls lean outward by half the horizontal span, so a
                // target behind the source still yields an S-curve.
                let offset = (end.x - start.x).abs() / 2.0;
                vec![
                    start,
                    Point::new(start.x + offset, start.y),
                    Point::new(end.x - offset, end.y),
                    end,
                ]
            }
            RoutingType::Orthogonal => {
                let mid_x = (start.x + end.x) / 2.0;
                vec![
                    start,
                    Point::new(mid_x, start.y),
                    Point::new(mid_x, end.y),
                    end,
                ]
            }
        };
        RoutedPath { routing, points }
    }

    /// Geometry of a stored edge, or `None` if an endpoint is missing.
    pub fn route_edge(&self, doc: &Document, edge: &Edge) -> Option<RoutedPath> {
        let source = doc.node(&edge.source_id)?;
        let target = doc.node(&edge.target_id)?;
        Some(self.compute_path(
            source,
            target,
            edge.source_port_id.as_deref(),
            edge.target_port_id.as_deref(),
            edge.routing_type,
        ))
    }

    /// Temporary endpoint for a connection being dragged from `source`.
    ///
    /// Finds the closest declared port on any other node; if it lies
    /// strictly within the magnetic radius, the endpoint is interpolated
    /// from the pointer toward it by the pull strength. Purely visual.
    pub fn magnetic_preview(
        &self,
        doc: &Document,
        source: &NodeId,
        pointer: Point,
    ) -> MagneticPreview {
        let mut nearest: Option<(f64, PortRef)> = None;

        for node in doc.nodes().filter(|n| &n.id != source) {
            let bounds = node.bounds();
            for port in &node.ports {
                let position = port.position(&bounds);
                let distance = position.distance_to(pointer);
                if nearest.as_ref().map_or(true, |(best, _)| distance < *best) {
                    nearest = Some((
                        distance,
                        PortRef {
                            node_id: node.id.clone(),
                            port_id: port.id.clone(),
                            position,
                        },
                    ));
                }
            }
        }

        match nearest {
            Some((distance, candidate)) if distance < self.magnetic_radius => MagneticPreview {
                point: lerp_point(pointer, candidate.position, self.pull_strength),
                candidate: Some(candidate),
            },
            _ => MagneticPreview {
                point: pointer,
                candidate: None,
            },
        }
    }

    /// Final endpoint of a connection released at `pointer` over `drop`.
    ///
    /// A port drop connects exactly to that port; a body drop connects to
    /// the nearest mid-side point. Drops on the source node, on unknown
    /// nodes or ports, and on empty canvas resolve to nothing. Magnetism
    /// plays no part here.
    pub fn resolve_drop(
        &self,
        doc: &Document,
        source: &NodeId,
        drop: &DropTarget,
        pointer: Point,
    ) -> Option<(NodeId, Option<String>)> {
        match drop {
            DropTarget::Port { node_id, port_id } if node_id != source => {
                let node = doc.node(node_id)?;
                node.port(port_id)?;
                Some((node_id.clone(), Some(port_id.clone())))
            }
            DropTarget::NodeBody { node_id } if node_id != source => {
                let node = doc.node(node_id)?;
                Some((node_id.clone(), self.nearest_port(node, pointer).port_id))
            }
            _ => None,
        }
    }
}

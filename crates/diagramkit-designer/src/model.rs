//! Plain-data entities of a diagram: nodes, ports and edges.
//!
//! These structs are also the wire format: their serde projection is exactly
//! the `NodeJSON`/`EdgeJSON` shape of the document file, with camelCase keys.
//! Edges refer to their endpoints by id only.

use std::collections::BTreeMap;

use diagramkit_core::{DiagramError, DiagramResult, EdgeId, EntityKind, NodeId, Point, Rect};
use diagramkit_settings::RoutingStyle;
use serde::{Deserialize, Serialize};

/// Presentation attributes (`fill`, `stroke`, ...). Opaque to the engine.
pub type StyleMap = BTreeMap<String, String>;

/// Extension data carried verbatim through every operation.
pub type DataMap = serde_json::Map<String, serde_json::Value>;

/// Side of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Iteration order used wherever sides compete; earlier wins ties.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    /// Point at `offset` (0..=1) along this side of `bounds`.
    pub fn point_on(&self, bounds: &Rect, offset: f64) -> Point {
        match self {
            Side::Top => Point::new(bounds.x + offset * bounds.width, bounds.y),
            Side::Right => Point::new(bounds.right(), bounds.y + offset * bounds.height),
            Side::Bottom => Point::new(bounds.x + offset * bounds.width, bounds.bottom()),
            Side::Left => Point::new(bounds.x, bounds.y + offset * bounds.height),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attachment point on a node boundary.
///
/// Only the side and fractional offset are stored; the absolute position is
/// recomputed from the owning node's current bounds every time it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub side: Side,
    pub offset: f64,
}

impl Port {
    pub fn new(id: impl Into<String>, side: Side, offset: f64) -> Self {
        Self {
            id: id.into(),
            side,
            offset: offset.clamp(0.0, 1.0),
        }
    }

    /// Mid-side port whose id is the side name.
    pub fn mid(side: Side) -> Self {
        Self::new(side.as_str(), side, 0.5)
    }

    /// The four mid-side ports in top, right, bottom, left order.
    pub fn cardinal() -> Vec<Port> {
        Side::ALL.iter().map(|side| Port::mid(*side)).collect()
    }

    pub fn position(&self, bounds: &Rect) -> Point {
        self.side.point_on(bounds, self.offset)
    }
}

/// Geometric style used to draw an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingType {
    #[default]
    Straight,
    Bezier,
    Orthogonal,
}

impl From<RoutingStyle> for RoutingType {
    fn from(style: RoutingStyle) -> Self {
        match style {
            RoutingStyle::Straight => RoutingType::Straight,
            RoutingStyle::Bezier => RoutingType::Bezier,
            RoutingStyle::Orthogonal => RoutingType::Orthogonal,
        }
    }
}

impl std::fmt::Display for RoutingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingType::Straight => write!(f, "straight"),
            RoutingType::Bezier => write!(f, "bezier"),
            RoutingType::Orthogonal => write!(f, "orthogonal"),
        }
    }
}

/// A typed shape placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub shape_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub data: DataMap,
}

impl Node {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn port(&self, port_id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == port_id)
    }

    /// Absolute position of a declared port, from the current bounds.
    pub fn port_position(&self, port_id: &str) -> Option<Point> {
        self.port(port_id).map(|p| p.position(&self.bounds()))
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.bounds().contains_point(point)
    }

    /// Checks the entity invariants: finite geometry, positive size and
    /// unique port ids.
    pub fn validate(&self) -> DiagramResult<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || !(self.width > 0.0 && self.height > 0.0) {
            return Err(DiagramError::InvalidGeometry {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            });
        }

        for (i, port) in self.ports.iter().enumerate() {
            if self.ports[..i].iter().any(|p| p.id == port.id) {
                return Err(DiagramError::DuplicateId {
                    kind: EntityKind::Port,
                    id: port.id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// `None` means the router resolves the nearest port at render time.
    #[serde(default)]
    pub source_port_id: Option<String>,
    #[serde(default)]
    pub target_port_id: Option<String>,
    #[serde(default)]
    pub routing_type: RoutingType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default)]
    pub data: DataMap,
}

impl Edge {
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source_id == node_id || &self.target_id == node_id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }

    /// Same endpoints and ports, ignoring id and presentation.
    pub fn connects_same_as(&self, other: &Edge) -> bool {
        self.source_id == other.source_id
            && self.target_id == other.target_id
            && self.source_port_id == other.source_port_id
            && self.target_port_id == other.target_port_id
    }
}

/// Caller-supplied values for a new node, layered over the shape defaults.
///
/// `style` is merged key-by-key into the default style; every other field
/// replaces the default outright.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOverrides {
    pub id: Option<NodeId>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub label: Option<String>,
    pub style: StyleMap,
    pub ports: Option<Vec<Port>>,
    pub z_index: Option<i64>,
    pub data: Option<DataMap>,
}

impl NodeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.ports = Some(ports);
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = Some(data);
        self
    }

    /// Every field of `node` except id and position.
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: None,
            width: Some(node.width),
            height: Some(node.height),
            label: Some(node.label.clone()),
            style: node.style.clone(),
            ports: Some(node.ports.clone()),
            z_index: Some(node.z_index),
            data: Some(node.data.clone()),
        }
    }
}

/// Recognised node fields an update may change. `id` and `type` are fixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub label: Option<String>,
    pub style: Option<StyleMap>,
    pub ports: Option<Vec<Port>>,
    pub z_index: Option<i64>,
    pub data: Option<DataMap>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn bounds(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Default::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Default::default()
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.ports = Some(ports);
        self
    }

    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = Some(data);
        self
    }

    /// Shallow merge: each present field replaces the node's value.
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(width) = self.width {
            node.width = width;
        }
        if let Some(height) = self.height {
            node.height = height;
        }
        if let Some(label) = &self.label {
            node.label = label.clone();
        }
        if let Some(style) = &self.style {
            node.style = style.clone();
        }
        if let Some(ports) = &self.ports {
            node.ports = ports.clone();
        }
        if let Some(z_index) = self.z_index {
            node.z_index = z_index;
        }
        if let Some(data) = &self.data {
            node.data = data.clone();
        }
    }
}

/// Caller-supplied values for a new edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOverrides {
    pub id: Option<EdgeId>,
    pub source_port_id: Option<String>,
    pub target_port_id: Option<String>,
    pub routing_type: Option<RoutingType>,
    pub label: Option<String>,
    pub style: StyleMap,
    pub data: Option<DataMap>,
}

impl EdgeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_ports(mut self, source: Option<&str>, target: Option<&str>) -> Self {
        self.source_port_id = source.map(str::to_string);
        self.target_port_id = target.map(str::to_string);
        self
    }

    pub fn with_routing(mut self, routing: RoutingType) -> Self {
        self.routing_type = Some(routing);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    /// Every field of `edge` except id and endpoints.
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            id: None,
            source_port_id: edge.source_port_id.clone(),
            target_port_id: edge.target_port_id.clone(),
            routing_type: Some(edge.routing_type),
            label: Some(edge.label.clone()),
            style: edge.style.clone(),
            data: Some(edge.data.clone()),
        }
    }
}

/// Recognised edge fields an update may change. Endpoints are changed only
/// through [`crate::document::Document::reverse_edge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    /// `Some(None)` clears the port, deferring to nearest-port resolution.
    pub source_port_id: Option<Option<String>>,
    pub target_port_id: Option<Option<String>>,
    pub routing_type: Option<RoutingType>,
    pub label: Option<String>,
    pub style: Option<StyleMap>,
    pub data: Option<DataMap>,
}

impl EdgePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routing(routing: RoutingType) -> Self {
        Self {
            routing_type: Some(routing),
            ..Default::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn with_source_port(mut self, port: Option<&str>) -> Self {
        self.source_port_id = Some(port.map(str::to_string));
        self
    }

    pub fn with_target_port(mut self, port: Option<&str>) -> Self {
        self.target_port_id = Some(port.map(str::to_string));
        self
    }

    pub fn apply_to(&self, edge: &mut Edge) {
        if let Some(port) = &self.source_port_id {
            edge.source_port_id = port.clone();
        }
        if let Some(port) = &self.target_port_id {
            edge.target_port_id = port.clone();
        }
        if let Some(routing) = self.routing_type {
            edge.routing_type = routing;
        }
        if let Some(label) = &self.label {
            edge.label = label.clone();
        }
        if let Some(style) = &self.style {
            edge.style = style.clone();
        }
        if let Some(data) = &self.data {
            edge.data = data.clone();
        }
    }
}

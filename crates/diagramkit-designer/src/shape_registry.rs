//! Shape type registry.
//!
//! Shapes are data, not classes: a [`ShapeDefinition`] names its defaults and
//! one of a closed set of render hints. A "decision" is a diamond hint with
//! its own size and colours rather than a subtype of the diamond.

use diagramkit_core::{DiagramError, DiagramResult, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{DataMap, Node, NodeOverrides, Port, RoutingType, Side, StyleMap};

/// Default size for definitions that do not specify one.
pub const DEFAULT_SHAPE_WIDTH: f64 = 100.0;
pub const DEFAULT_SHAPE_HEIGHT: f64 = 60.0;

/// Geometry the rendering collaborator should draw for a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderHint {
    Rect,
    RoundedRect,
    Ellipse,
    Diamond,
    Pill,
}

/// Registry entry for one shape type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDefinition {
    pub shape_type: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub default_width: f64,
    pub default_height: f64,
    pub default_ports: Vec<Port>,
    pub default_style: StyleMap,
    pub render_hint: RenderHint,
    /// Routing suggested for edges leaving this shape, if any.
    #[serde(default)]
    pub routing_hint: Option<RoutingType>,
}

impl ShapeDefinition {
    pub fn new(shape_type: impl Into<String>, render_hint: RenderHint) -> Self {
        let shape_type = shape_type.into();
        Self {
            name: shape_type.clone(),
            shape_type,
            category: "basic".to_string(),
            description: String::new(),
            default_width: DEFAULT_SHAPE_WIDTH,
            default_height: DEFAULT_SHAPE_HEIGHT,
            default_ports: Vec::new(),
            default_style: StyleMap::new(),
            render_hint,
            routing_hint: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }

    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.default_ports = ports;
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_style.insert(key.into(), value.into());
        self
    }

    pub fn with_routing_hint(mut self, routing: RoutingType) -> Self {
        self.routing_hint = Some(routing);
        self
    }

    /// Builds a node from these defaults with `overrides` layered on top.
    ///
    /// The result is not validated; callers decide how to report bad sizes.
    pub fn instantiate(&self, id: NodeId, x: f64, y: f64, overrides: NodeOverrides) -> Node {
        let mut style = self.default_style.clone();
        style.extend(overrides.style);

        Node {
            id,
            shape_type: self.shape_type.clone(),
            x,
            y,
            width: overrides.width.unwrap_or(self.default_width),
            height: overrides.height.unwrap_or(self.default_height),
            label: overrides.label.unwrap_or_default(),
            style,
            ports: overrides
                .ports
                .unwrap_or_else(|| self.default_ports.clone()),
            z_index: overrides.z_index.unwrap_or(0),
            data: overrides.data.unwrap_or_else(DataMap::new),
        }
    }
}

/// Flat mapping from shape type name to its definition.
///
/// Populated once at start-up, then shared read-only (typically as
/// `Arc<ShapeRegistry>`). Iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    definitions: IndexMap<String, ShapeDefinition>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the basic and flowchart shapes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        load_builtin_shapes(&mut registry);
        registry
    }

    /// Adds or replaces a definition, returning the one it replaced.
    pub fn register(&mut self, definition: ShapeDefinition) -> Option<ShapeDefinition> {
        tracing::debug!(
            "Registering shape '{}' in category '{}'",
            definition.shape_type,
            definition.category
        );
        self.definitions
            .insert(definition.shape_type.clone(), definition)
    }

    pub fn unregister(&mut self, shape_type: &str) -> Option<ShapeDefinition> {
        self.definitions.shift_remove(shape_type)
    }

    pub fn get(&self, shape_type: &str) -> Option<&ShapeDefinition> {
        self.definitions.get(shape_type)
    }

    /// Like [`get`](Self::get) but failing with `UnknownShapeType`.
    pub fn require(&self, shape_type: &str) -> DiagramResult<&ShapeDefinition> {
        self.get(shape_type)
            .ok_or_else(|| DiagramError::UnknownShapeType {
                shape_type: shape_type.to_string(),
            })
    }

    pub fn contains(&self, shape_type: &str) -> bool {
        self.definitions.contains_key(shape_type)
    }

    /// Definitions in `category`, in registration order.
    pub fn category(&self, category: &str) -> Vec<&ShapeDefinition> {
        self.definitions
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Distinct category names in first-registration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for definition in self.definitions.values() {
            if !categories.contains(&definition.category.as_str()) {
                categories.push(&definition.category);
            }
        }
        categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn outlined(definition: ShapeDefinition, fill: &str, stroke: &str) -> ShapeDefinition {
    definition
        .with_style("fill", fill)
        .with_style("stroke", stroke)
        .with_style("strokeWidth", "2")
}

/// Registers the built-in shape library.
pub fn load_builtin_shapes(registry: &mut ShapeRegistry) {
    registry.register(
        outlined(
            ShapeDefinition::new("rect", RenderHint::RoundedRect)
                .with_name("Rectangle")
                .with_size(120.0, 60.0)
                .with_ports(Port::cardinal()),
            "#ffffff",
            "#333333",
        )
        .with_style("rx", "4"),
    );
    registry.register(outlined(
        ShapeDefinition::new("circle", RenderHint::Ellipse)
            .with_name("Circle")
            .with_size(80.0, 80.0)
            .with_ports(Port::cardinal()),
        "#ffffff",
        "#333333",
    ));
    registry.register(outlined(
        ShapeDefinition::new("diamond", RenderHint::Diamond)
            .with_name("Diamond")
            .with_size(100.0, 100.0)
            .with_ports(Port::cardinal()),
        "#ffffff",
        "#333333",
    ));

    registry.register(
        outlined(
            ShapeDefinition::new("process", RenderHint::RoundedRect)
                .with_name("Process")
                .with_category("flowchart")
                .with_size(120.0, 60.0)
                .with_ports(Port::cardinal()),
            "#E3F2FD",
            "#1976D2",
        )
        .with_style("rx", "4"),
    );
    registry.register(
        outlined(
            ShapeDefinition::new("decision", RenderHint::Diamond)
                .with_name("Decision")
                .with_category("flowchart")
                .with_size(120.0, 80.0)
                .with_ports(Port::cardinal()),
            "#FFF3E0",
            "#F57C00",
        )
        .with_routing_hint(RoutingType::Orthogonal),
    );
    registry.register(outlined(
        ShapeDefinition::new("terminator", RenderHint::Pill)
            .with_name("Terminator")
            .with_category("flowchart")
            .with_size(120.0, 60.0)
            .with_ports(vec![Port::mid(Side::Top), Port::mid(Side::Bottom)]),
        "#E8F5E9",
        "#388E3C",
    ));
}

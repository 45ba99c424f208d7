//! Pointer gestures as short-lived sessions.
//!
//! A session captures the state it needs at `start`. Every `update`
//! recomputes from that captured state plus the current pointer, so
//! rounding never accumulates across moves. Intermediate updates write
//! straight to the document without history; `end` hands back the single
//! command describing the whole gesture, and `cancel` puts the document
//! back as it was.

use diagramkit_core::constants::{MIN_NODE_HEIGHT, MIN_NODE_WIDTH};
use diagramkit_core::{DiagramError, DiagramResult, EntityKind, NodeId, Point, Rect};
use diagramkit_settings::InteractionSettings;

use crate::commands::{DesignerCommand, MoveNodes, NodeMove};
use crate::document::Document;
use crate::model::{Node, NodePatch, RoutingType};
use crate::routing::{ConnectionRouter, DropTarget, PortRef, RoutedPath};
use crate::snap::SnapEngine;

/// Moves one or more nodes rigidly.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    start_pointer: Point,
    origins: Vec<(NodeId, Point)>,
}

impl DragSession {
    /// Captures the current positions of `node_ids`.
    pub fn start(doc: &Document, node_ids: &[NodeId], pointer: Point) -> DiagramResult<Self> {
        let origins = node_ids
            .iter()
            .map(|id| {
                doc.require_node(id)
                    .map(|n| (id.clone(), Point::new(n.x, n.y)))
            })
            .collect::<DiagramResult<Vec<_>>>()?;
        Ok(Self {
            start_pointer: pointer,
            origins,
        })
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.origins.iter().map(|(id, _)| id)
    }

    /// Moves every dragged node by the pointer delta.
    ///
    /// With a snap engine, the first dragged node is snapped (grid, then
    /// alignment with non-dragged nodes) and the rest follow by the same
    /// delta.
    pub fn update(
        &self,
        doc: &mut Document,
        pointer: Point,
        snap: Option<&SnapEngine>,
    ) -> DiagramResult<()> {
        let mut dx = pointer.x - self.start_pointer.x;
        let mut dy = pointer.y - self.start_pointer.y;

        if let (Some(snap), Some((anchor_id, anchor_origin))) = (snap, self.origins.first()) {
            let anchor = doc.require_node(anchor_id)?;
            let others: Vec<&Node> = doc
                .nodes()
                .filter(|n| !self.origins.iter().any(|(id, _)| id == &n.id))
                .collect();
            let snapped = snap.snap_position(
                anchor,
                anchor_origin.x + dx,
                anchor_origin.y + dy,
                others,
            );
            dx = snapped.x - anchor_origin.x;
            dy = snapped.y - anchor_origin.y;
        }

        for (id, origin) in &self.origins {
            doc.set_node_position(id, origin.x + dx, origin.y + dy)?;
        }
        Ok(())
    }

    /// The command for the completed gesture, or `None` if nothing moved.
    /// Its effect is already in the document.
    pub fn end(self, doc: &Document) -> Option<DesignerCommand> {
        let moves: Vec<(NodeId, NodeMove)> = self
            .origins
            .into_iter()
            .filter_map(|(id, from)| {
                let node = doc.node(&id)?;
                let to = Point::new(node.x, node.y);
                Some((id, NodeMove { from, to }))
            })
            .collect();
        let command = DesignerCommand::MoveNodes(MoveNodes { moves });
        (!command.is_noop()).then_some(command)
    }

    /// Puts every dragged node back where it started.
    pub fn cancel(self, doc: &mut Document) -> DiagramResult<()> {
        for (id, origin) in &self.origins {
            if doc.contains_node(id) {
                doc.set_node_position(id, origin.x, origin.y)?;
            }
        }
        Ok(())
    }
}

/// Resize handle on a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::E,
        ResizeHandle::W,
        ResizeHandle::NE,
        ResizeHandle::NW,
        ResizeHandle::SE,
        ResizeHandle::SW,
    ];

    fn moves_north(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    fn moves_south(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    fn moves_east(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    fn moves_west(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::NE | ResizeHandle::NW | ResizeHandle::SE | ResizeHandle::SW
        )
    }

    /// Position of this handle on `bounds`.
    pub fn position(self, bounds: &Rect) -> Point {
        let x = if self.moves_west() {
            bounds.x
        } else if self.moves_east() {
            bounds.right()
        } else {
            bounds.x + bounds.width / 2.0
        };
        let y = if self.moves_north() {
            bounds.y
        } else if self.moves_south() {
            bounds.bottom()
        } else {
            bounds.y + bounds.height / 2.0
        };
        Point::new(x, y)
    }
}

/// Resizes a single node from one handle, keeping the opposite side fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    handle: ResizeHandle,
    start_pointer: Point,
    original: Node,
    min_width: f64,
    min_height: f64,
}

impl ResizeSession {
    pub fn start(
        doc: &Document,
        node_id: &NodeId,
        handle: ResizeHandle,
        pointer: Point,
    ) -> DiagramResult<Self> {
        Ok(Self {
            handle,
            start_pointer: pointer,
            original: doc.require_node(node_id)?.clone(),
            min_width: MIN_NODE_WIDTH,
            min_height: MIN_NODE_HEIGHT,
        })
    }

    pub fn with_settings(mut self, settings: &InteractionSettings) -> Self {
        self.min_width = settings.min_node_width;
        self.min_height = settings.min_node_height;
        self
    }

    pub fn node_id(&self) -> &NodeId {
        &self.original.id
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// Bounds for the pointer at `pointer`, without touching the document.
    ///
    /// With `keep_aspect`, the dimension that changed more drives the other
    /// through the original ratio. Grid snapping of the size, then the
    /// minimum size, are applied last; the minimum wins over the ratio.
    pub fn compute_bounds(
        &self,
        pointer: Point,
        keep_aspect: bool,
        snap: Option<&SnapEngine>,
    ) -> Rect {
        let start = self.original.bounds();
        let dx = pointer.x - self.start_pointer.x;
        let dy = pointer.y - self.start_pointer.y;
        let handle = self.handle;

        let mut width = start.width;
        let mut height = start.height;
        if handle.moves_east() {
            width += dx;
        } else if handle.moves_west() {
            width -= dx;
        }
        if handle.moves_south() {
            height += dy;
        } else if handle.moves_north() {
            height -= dy;
        }

        if keep_aspect && start.height > 0.0 {
            let ratio = start.width / start.height;
            let width_driven = if handle.is_corner() {
                (width - start.width).abs() >= (height - start.height).abs() * ratio
            } else {
                handle.moves_east() || handle.moves_west()
            };
            if width_driven {
                height = width / ratio;
            } else {
                width = height * ratio;
            }
        }

        if let Some(snap) = snap {
            (width, height) = snap.snap_size(width, height);
        }
        width = width.max(self.min_width);
        height = height.max(self.min_height);

        let x = if handle.moves_west() {
            start.right() - width
        } else {
            start.x
        };
        let y = if handle.moves_north() {
            start.bottom() - height
        } else {
            start.y
        };
        Rect::new(x, y, width, height)
    }

    pub fn update(
        &self,
        doc: &mut Document,
        pointer: Point,
        keep_aspect: bool,
        snap: Option<&SnapEngine>,
    ) -> DiagramResult<()> {
        let bounds = self.compute_bounds(pointer, keep_aspect, snap);
        doc.update_node(&self.original.id, &NodePatch::bounds(bounds))?;
        Ok(())
    }

    /// The command for the completed gesture, or `None` if nothing changed.
    pub fn end(self, doc: &Document) -> Option<DesignerCommand> {
        let current = doc.node(&self.original.id)?.clone();
        let command = DesignerCommand::update_node(self.original, current);
        (!command.is_noop()).then_some(command)
    }

    pub fn cancel(self, doc: &mut Document) -> DiagramResult<()> {
        if doc.contains_node(&self.original.id) {
            doc.set_node(self.original)?;
        }
        Ok(())
    }
}

/// What a finished connection drag asks for; validation and commit are up
/// to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRequest {
    pub source_id: NodeId,
    pub source_port_id: Option<String>,
    pub target_id: NodeId,
    pub target_port_id: Option<String>,
}

/// Temporary edge shown while a connection is dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPreview {
    pub start: Point,
    pub end: Point,
    /// Port currently pulling the endpoint.
    pub candidate: Option<PortRef>,
}

impl ConnectionPreview {
    /// S-curve from start to end, as drawn for the temporary edge.
    pub fn path(&self) -> RoutedPath {
        let mid_x = (self.start.x + self.end.x) / 2.0;
        RoutedPath {
            routing: RoutingType::Bezier,
            points: vec![
                self.start,
                Point::new(mid_x, self.start.y),
                Point::new(mid_x, self.end.y),
                self.end,
            ],
        }
    }
}

/// Drags a new edge out of a node. Never mutates the document itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSession {
    source_id: NodeId,
    source_port_id: Option<String>,
}

impl ConnectionSession {
    pub fn start(doc: &Document, source_id: &NodeId, port_id: Option<&str>) -> DiagramResult<Self> {
        let node = doc.require_node(source_id)?;
        if let Some(port_id) = port_id {
            if node.port(port_id).is_none() {
                return Err(DiagramError::NotFound {
                    kind: EntityKind::Port,
                    id: format!("{}:{}", source_id, port_id),
                });
            }
        }
        Ok(Self {
            source_id: source_id.clone(),
            source_port_id: port_id.map(str::to_string),
        })
    }

    pub fn source_id(&self) -> &NodeId {
        &self.source_id
    }

    /// Preview for the pointer at `pointer`, with magnetic pull applied.
    pub fn update(
        &self,
        doc: &Document,
        router: &ConnectionRouter,
        pointer: Point,
    ) -> Option<ConnectionPreview> {
        let source = doc.node(&self.source_id)?;
        let start = self
            .source_port_id
            .as_deref()
            .and_then(|id| source.port_position(id))
            .unwrap_or_else(|| source.center());
        let magnet = router.magnetic_preview(doc, &self.source_id, pointer);
        Some(ConnectionPreview {
            start,
            end: magnet.point,
            candidate: magnet.candidate,
        })
    }

    /// Resolves the release point. Magnetism does not influence the result.
    pub fn finish(
        self,
        doc: &Document,
        router: &ConnectionRouter,
        drop: &DropTarget,
        pointer: Point,
    ) -> Option<ConnectionRequest> {
        let (target_id, target_port_id) = router.resolve_drop(doc, &self.source_id, drop, pointer)?;
        Some(ConnectionRequest {
            source_id: self.source_id,
            source_port_id: self.source_port_id,
            target_id,
            target_port_id,
        })
    }
}

//! Pointer gestures driven through the designer state.
//!
//! At most one gesture runs at a time; starting another cancels the
//! current one first. Pointer positions are in document coordinates.

use diagramkit_core::{DiagramResult, NodeId, Point};

use super::DesignerState;
use crate::interaction::{
    ConnectionPreview, ConnectionSession, DragSession, ResizeHandle, ResizeSession,
};
use crate::model::{Edge, EdgeOverrides};
use crate::routing::DropTarget;

/// The gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveSession {
    Drag(DragSession),
    Resize(ResizeSession),
    Connection(ConnectionSession),
}

impl DesignerState {
    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    /// Starts dragging `node_ids` from `pointer`.
    pub fn begin_drag(&mut self, node_ids: &[NodeId], pointer: Point) -> DiagramResult<()> {
        self.cancel_interaction()?;
        let session = DragSession::start(&self.document, node_ids, pointer)?;
        self.session = Some(ActiveSession::Drag(session));
        Ok(())
    }

    /// Starts dragging the current node selection.
    pub fn begin_drag_selection(&mut self, pointer: Point) -> DiagramResult<()> {
        let ids = self.document.selected_node_ids();
        self.begin_drag(&ids, pointer)
    }

    /// Returns false when no drag is in progress.
    pub fn drag_to(&mut self, pointer: Point) -> DiagramResult<bool> {
        let Some(ActiveSession::Drag(session)) = &self.session else {
            return Ok(false);
        };
        session.update(&mut self.document, pointer, Some(&self.snap))?;
        Ok(true)
    }

    pub fn begin_resize(
        &mut self,
        node_id: &NodeId,
        handle: ResizeHandle,
        pointer: Point,
    ) -> DiagramResult<()> {
        self.cancel_interaction()?;
        let session = ResizeSession::start(&self.document, node_id, handle, pointer)?
            .with_settings(&self.config.interaction);
        self.session = Some(ActiveSession::Resize(session));
        Ok(())
    }

    /// Returns false when no resize is in progress.
    pub fn resize_to(&mut self, pointer: Point, keep_aspect: bool) -> DiagramResult<bool> {
        let Some(ActiveSession::Resize(session)) = &self.session else {
            return Ok(false);
        };
        session.update(&mut self.document, pointer, keep_aspect, Some(&self.snap))?;
        Ok(true)
    }

    /// Starts a connection from `node_id`, optionally from a specific port.
    pub fn begin_connection(&mut self, node_id: &NodeId, port_id: Option<&str>) -> DiagramResult<()> {
        self.cancel_interaction()?;
        let session = ConnectionSession::start(&self.document, node_id, port_id)?;
        self.session = Some(ActiveSession::Connection(session));
        Ok(())
    }

    /// Preview of the connection being dragged; never changes the document.
    pub fn connection_preview(&self, pointer: Point) -> Option<ConnectionPreview> {
        match &self.session {
            Some(ActiveSession::Connection(session)) => {
                session.update(&self.document, &self.router, pointer)
            }
            _ => None,
        }
    }

    /// Ends a connection drag. Returns the new edge, or `None` if the drop
    /// did not resolve to a target. A rejected connection is an error and
    /// leaves the document untouched.
    pub fn finish_connection(
        &mut self,
        drop: &DropTarget,
        pointer: Point,
    ) -> DiagramResult<Option<Edge>> {
        let Some(ActiveSession::Connection(session)) = self.session.take() else {
            return Ok(None);
        };
        let Some(request) = session.finish(&self.document, &self.router, drop, pointer) else {
            tracing::debug!("Connection dropped on nothing");
            return Ok(None);
        };
        let overrides = EdgeOverrides::new().with_ports(
            request.source_port_id.as_deref(),
            request.target_port_id.as_deref(),
        );
        self.connect(&request.source_id, &request.target_id, overrides)
            .map(Some)
    }

    /// Commits the drag or resize in progress as one history entry.
    /// Returns false if there was nothing to record.
    pub fn end_interaction(&mut self) -> DiagramResult<bool> {
        let command = match self.session.take() {
            Some(ActiveSession::Drag(session)) => session.end(&self.document),
            Some(ActiveSession::Resize(session)) => session.end(&self.document),
            Some(ActiveSession::Connection(_)) | None => None,
        };
        match command {
            Some(command) => {
                self.record(command);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Commits a drag or resize in progress before another recorded
    /// action runs. A pending connection stays open; it never touches the
    /// document.
    pub(super) fn settle_interaction(&mut self) -> DiagramResult<()> {
        if matches!(
            self.session,
            Some(ActiveSession::Drag(_)) | Some(ActiveSession::Resize(_))
        ) {
            self.end_interaction()?;
        }
        Ok(())
    }

    /// Abandons the gesture in progress and restores the document.
    pub fn cancel_interaction(&mut self) -> DiagramResult<()> {
        match self.session.take() {
            Some(ActiveSession::Drag(session)) => session.cancel(&mut self.document),
            Some(ActiveSession::Resize(session)) => session.cancel(&mut self.document),
            Some(ActiveSession::Connection(_)) | None => Ok(()),
        }
    }
}

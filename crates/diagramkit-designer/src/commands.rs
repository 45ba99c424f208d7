//! Reversible document mutations.
//!
//! Commands are snapshot-based: each carries enough before/after state to
//! restore either side exactly, so undo never relies on arithmetic inverses.

use diagramkit_core::{DiagramError, DiagramResult, EdgeId, NodeId, Point};

use crate::document::{Document, RemovedNode};
use crate::model::{Edge, Node};

#[derive(Debug, Clone, PartialEq)]
pub enum DesignerCommand {
    AddNode(AddNode),
    RemoveNode(RemoveNode),
    UpdateNode(UpdateNode),
    MoveNodes(MoveNodes),
    AddEdge(AddEdge),
    RemoveEdge(RemoveEdge),
    UpdateEdge(UpdateEdge),
    Composite(CompositeCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddNode {
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveNode {
    pub id: NodeId,
    pub removed: Option<RemovedNode>, // Some while applied
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateNode {
    pub before: Node,
    pub after: Node,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMove {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveNodes {
    pub moves: Vec<(NodeId, NodeMove)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddEdge {
    pub edge: Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveEdge {
    pub id: EdgeId,
    pub removed: Option<(usize, Edge)>, // Some while applied
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEdge {
    pub before: Edge,
    pub after: Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCommand {
    pub commands: Vec<DesignerCommand>,
    pub name: String,
}

impl DesignerCommand {
    pub fn add_node(node: Node) -> Self {
        DesignerCommand::AddNode(AddNode { node })
    }

    pub fn remove_node(id: NodeId) -> Self {
        DesignerCommand::RemoveNode(RemoveNode { id, removed: None })
    }

    pub fn update_node(before: Node, after: Node) -> Self {
        DesignerCommand::UpdateNode(UpdateNode { before, after })
    }

    pub fn add_edge(edge: Edge) -> Self {
        DesignerCommand::AddEdge(AddEdge { edge })
    }

    pub fn remove_edge(id: EdgeId) -> Self {
        DesignerCommand::RemoveEdge(RemoveEdge { id, removed: None })
    }

    pub fn update_edge(before: Edge, after: Edge) -> Self {
        DesignerCommand::UpdateEdge(UpdateEdge { before, after })
    }

    pub fn composite(name: impl Into<String>, commands: Vec<DesignerCommand>) -> Self {
        DesignerCommand::Composite(CompositeCommand {
            commands,
            name: name.into(),
        })
    }

    /// One undoable deletion of `nodes` (with their cascades) and of every
    /// edge in `edges` the cascades do not already cover. Ids that are not
    /// live are ignored; `None` if nothing would be deleted.
    pub fn delete_entities(
        doc: &Document,
        nodes: &[NodeId],
        edges: &[EdgeId],
        name: &str,
    ) -> Option<Self> {
        let nodes: Vec<&NodeId> = nodes.iter().filter(|id| doc.contains_node(id)).collect();
        let mut commands: Vec<DesignerCommand> = edges
            .iter()
            .filter(|id| {
                doc.edge(id).is_some_and(|edge| {
                    !nodes.iter().any(|node_id| edge.touches(node_id))
                })
            })
            .map(|id| DesignerCommand::remove_edge(id.clone()))
            .collect();
        commands.extend(nodes.into_iter().map(|id| DesignerCommand::remove_node(id.clone())));

        match commands.len() {
            0 => None,
            1 => commands.pop(),
            _ => Some(DesignerCommand::composite(name, commands)),
        }
    }

    /// Display name, e.g. for an "Undo Move" menu entry.
    pub fn name(&self) -> &str {
        match self {
            DesignerCommand::AddNode(_) => "Add Node",
            DesignerCommand::RemoveNode(_) => "Delete Node",
            DesignerCommand::UpdateNode(_) => "Edit Node",
            DesignerCommand::MoveNodes(_) => "Move",
            DesignerCommand::AddEdge(_) => "Connect",
            DesignerCommand::RemoveEdge(_) => "Delete Connection",
            DesignerCommand::UpdateEdge(_) => "Edit Connection",
            DesignerCommand::Composite(cmd) => &cmd.name,
        }
    }

    pub fn apply(&mut self, doc: &mut Document) -> DiagramResult<()> {
        match self {
            DesignerCommand::AddNode(cmd) => {
                doc.insert_node(cmd.node.clone())?;
            }
            DesignerCommand::RemoveNode(cmd) => {
                let removed = doc
                    .remove_node(&cmd.id)
                    .ok_or_else(|| DiagramError::node_not_found(cmd.id.as_str()))?;
                cmd.removed = Some(removed);
            }
            DesignerCommand::UpdateNode(cmd) => {
                doc.set_node(cmd.after.clone())?;
            }
            DesignerCommand::MoveNodes(cmd) => {
                for (id, _) in &cmd.moves {
                    doc.require_node(id)?;
                }
                for (id, m) in &cmd.moves {
                    doc.set_node_position(id, m.to.x, m.to.y)?;
                }
            }
            DesignerCommand::AddEdge(cmd) => {
                doc.insert_edge(cmd.edge.clone())?;
            }
            DesignerCommand::RemoveEdge(cmd) => {
                let removed = doc
                    .remove_edge(&cmd.id)
                    .ok_or_else(|| DiagramError::edge_not_found(cmd.id.as_str()))?;
                cmd.removed = Some(removed);
            }
            DesignerCommand::UpdateEdge(cmd) => {
                doc.set_edge(cmd.after.clone())?;
            }
            DesignerCommand::Composite(cmd) => {
                doc.batched(|doc| {
                    for i in 0..cmd.commands.len() {
                        if let Err(err) = cmd.commands[i].apply(doc) {
                            // Roll back what already went through
                            for done in cmd.commands[..i].iter_mut().rev() {
                                if let Err(rollback) = done.invert(doc) {
                                    tracing::warn!(
                                        "Rollback of '{}' failed: {}",
                                        done.name(),
                                        rollback
                                    );
                                }
                            }
                            return Err(err);
                        }
                    }
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    pub fn invert(&mut self, doc: &mut Document) -> DiagramResult<()> {
        match self {
            DesignerCommand::AddNode(cmd) => {
                doc.remove_node(&cmd.node.id);
            }
            DesignerCommand::RemoveNode(cmd) => {
                if let Some(removed) = cmd.removed.take() {
                    if let Err(err) = doc.restore_node(removed.clone()) {
                        cmd.removed = Some(removed);
                        return Err(err);
                    }
                }
            }
            DesignerCommand::UpdateNode(cmd) => {
                doc.set_node(cmd.before.clone())?;
            }
            DesignerCommand::MoveNodes(cmd) => {
                for (id, _) in &cmd.moves {
                    doc.require_node(id)?;
                }
                for (id, m) in &cmd.moves {
                    doc.set_node_position(id, m.from.x, m.from.y)?;
                }
            }
            DesignerCommand::AddEdge(cmd) => {
                doc.remove_edge(&cmd.edge.id);
            }
            DesignerCommand::RemoveEdge(cmd) => {
                if let Some((index, edge)) = cmd.removed.take() {
                    if let Err(err) = doc.restore_edge(index, edge.clone()) {
                        cmd.removed = Some((index, edge));
                        return Err(err);
                    }
                }
            }
            DesignerCommand::UpdateEdge(cmd) => {
                doc.set_edge(cmd.before.clone())?;
            }
            DesignerCommand::Composite(cmd) => {
                doc.batched(|doc| {
                    cmd.commands
                        .iter_mut()
                        .rev()
                        .try_for_each(|sub_cmd| sub_cmd.invert(doc))
                })?;
            }
        }
        Ok(())
    }

    /// True when applying would not change anything.
    pub fn is_noop(&self) -> bool {
        match self {
            DesignerCommand::UpdateNode(cmd) => cmd.before == cmd.after,
            DesignerCommand::UpdateEdge(cmd) => cmd.before == cmd.after,
            DesignerCommand::MoveNodes(cmd) => cmd.moves.iter().all(|(_, m)| m.from == m.to),
            DesignerCommand::Composite(cmd) => cmd.commands.iter().all(DesignerCommand::is_noop),
            _ => false,
        }
    }
}

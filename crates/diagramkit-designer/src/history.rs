//! Undo/redo stacks.

use std::collections::VecDeque;
use std::sync::Arc;

use diagramkit_core::constants::DEFAULT_HISTORY_DEPTH;
use diagramkit_core::{DiagramEvent, DiagramResult, EventBus, HistoryEvent};

use crate::commands::DesignerCommand;
use crate::document::Document;

/// Linear undo history with a bounded undo stack.
///
/// `execute` applies first and records only on success. Any new command
/// discards the redo branch. When the undo stack exceeds `max_depth` the
/// oldest entry is dropped and can no longer be undone.
#[derive(Debug)]
pub struct CommandHistory {
    undo_stack: VecDeque<DesignerCommand>,
    redo_stack: Vec<DesignerCommand>,
    max_depth: usize,
    events: Arc<EventBus>,
}

impl CommandHistory {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self::with_max_depth(events, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_max_depth(events: Arc<EventBus>, max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            events,
        }
    }

    /// Applies `command` and records it.
    pub fn execute(&mut self, mut command: DesignerCommand, doc: &mut Document) -> DiagramResult<()> {
        command.apply(doc)?;
        self.record(command);
        Ok(())
    }

    /// Records a command whose effect is already in the document, as at the
    /// end of a drag gesture.
    pub fn record(&mut self, command: DesignerCommand) {
        tracing::debug!("History: {}", command.name());
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!("History full, dropping '{}'", evicted.name());
            }
        }
        self.redo_stack.clear();
        self.notify();
    }

    /// Reverts the most recent command. Returns false if there was none.
    pub fn undo(&mut self, doc: &mut Document) -> DiagramResult<bool> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = command.invert(doc) {
            tracing::warn!("Undo of '{}' failed: {}", command.name(), err);
            self.undo_stack.push_back(command);
            return Err(err);
        }
        tracing::debug!("Undo: {}", command.name());
        self.redo_stack.push(command);
        self.notify();
        Ok(true)
    }

    /// Re-applies the most recently undone command. Returns false if there
    /// was none.
    pub fn redo(&mut self, doc: &mut Document) -> DiagramResult<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.apply(doc) {
            tracing::warn!("Redo of '{}' failed: {}", command.name(), err);
            self.redo_stack.push(command);
            return Err(err);
        }
        tracing::debug!("Redo: {}", command.name());
        self.undo_stack.push_back(command);
        self.notify();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.back().map(DesignerCommand::name)
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(DesignerCommand::name)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Shrinking below the current depth drops the oldest entries.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        let excess = self.undo_stack.len().saturating_sub(self.max_depth);
        if excess > 0 {
            self.undo_stack.drain(..excess);
            self.notify();
        }
    }

    pub fn clear(&mut self) {
        let had_entries = self.can_undo() || self.can_redo();
        self.undo_stack.clear();
        self.redo_stack.clear();
        if had_entries {
            self.notify();
        }
    }

    fn notify(&self) {
        self.events.emit(DiagramEvent::History(HistoryEvent::Changed {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }));
    }
}

//! Undo/redo for structural edits.

use trackkit_core::{PieceId, PlacedPiece, PlacementError};

use super::TrackSession;
use crate::piece_store::PieceStore;

/// A recorded edit of the placed-piece set.
///
/// Each variant carries the full piece state it needs, so undo and redo
/// never depend on anything outside the store.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackCommand {
    Place { index: usize, piece: PlacedPiece },
    Remove { index: usize, piece: PlacedPiece },
    Move { before: PlacedPiece, after: PlacedPiece },
}

impl TrackCommand {
    /// Re-applies the edit.
    pub fn apply(&self, store: &mut PieceStore) -> Result<(), PlacementError> {
        match self {
            TrackCommand::Place { index, piece } => {
                store.restore(*index, piece.clone());
                Ok(())
            }
            TrackCommand::Remove { piece, .. } => store
                .remove(piece.id)
                .map(|_| ())
                .ok_or(PlacementError::UnknownPiece { id: piece.id.0 }),
            TrackCommand::Move { after, .. } => store.replace(after.clone()),
        }
    }

    /// Reverts the edit.
    pub fn undo(&self, store: &mut PieceStore) -> Result<(), PlacementError> {
        match self {
            TrackCommand::Place { piece, .. } => store
                .remove(piece.id)
                .map(|_| ())
                .ok_or(PlacementError::UnknownPiece { id: piece.id.0 }),
            TrackCommand::Remove { index, piece } => {
                store.restore(*index, piece.clone());
                Ok(())
            }
            TrackCommand::Move { before, .. } => store.replace(before.clone()),
        }
    }

    pub fn piece_id(&self) -> PieceId {
        match self {
            TrackCommand::Place { piece, .. } | TrackCommand::Remove { piece, .. } => piece.id,
            TrackCommand::Move { after, .. } => after.id,
        }
    }

    /// Name of the command for display.
    pub fn name(&self) -> &'static str {
        match self {
            TrackCommand::Place { .. } => "Place piece",
            TrackCommand::Remove { .. } => "Remove piece",
            TrackCommand::Move { .. } => "Move piece",
        }
    }
}

impl TrackSession {
    /// Records an already-applied edit.
    pub(crate) fn push_command(&mut self, cmd: TrackCommand) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
        let depth = self.settings.editor.history_depth.max(1);
        if self.undo_stack.len() > depth {
            let excess = self.undo_stack.len() - depth;
            self.undo_stack.drain(..excess);
        }
        self.is_modified = true;
    }

    /// Undo last change.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, PlacementError> {
        let Some(cmd) = self.undo_stack.pop() else {
            return Ok(false);
        };
        self.drag = None;
        if let Err(e) = cmd.undo(&mut self.store) {
            tracing::warn!("Undo of '{}' failed: {}", cmd.name(), e);
            return Err(e);
        }
        tracing::debug!("Undo: {} ({})", cmd.name(), cmd.piece_id());
        self.redo_stack.push(cmd);
        self.is_modified = true;
        self.line_stale = true;
        self.rebuild();
        Ok(true)
    }

    /// Redo last undo.
    pub fn redo(&mut self) -> Result<bool, PlacementError> {
        let Some(cmd) = self.redo_stack.pop() else {
            return Ok(false);
        };
        self.drag = None;
        if let Err(e) = cmd.apply(&mut self.store) {
            tracing::warn!("Redo of '{}' failed: {}", cmd.name(), e);
            return Err(e);
        }
        tracing::debug!("Redo: {} ({})", cmd.name(), cmd.piece_id());
        self.undo_stack.push(cmd);
        self.is_modified = true;
        self.line_stale = true;
        self.rebuild();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

//! Interactive drag of a new or already placed piece.
//!
//! While a drag is active the dragged piece never touches the store; its
//! pose lives only in the preview until the drag is confirmed.

use trackkit_core::math::{normalize_angle, Position};
use trackkit_core::{PieceId, PlacementError, Pose};

use super::TrackSession;
use crate::snap::SnapCandidate;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A piece taken from the catalog
    New,
    /// An already placed piece being repositioned
    Existing { id: PieceId, original: Pose },
}

impl DragSource {
    pub fn existing_id(&self) -> Option<PieceId> {
        match self {
            DragSource::New => None,
            DragSource::Existing { id, .. } => Some(*id),
        }
    }
}

/// Where the dragged piece would land if dropped now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub pose: Pose,
    /// The attachment used, if the piece snapped
    pub snap: Option<SnapCandidate>,
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct DragState {
    pub(crate) source: DragSource,
    pub(crate) piece_type: String,
    pub(crate) rotation: f64,
    pub(crate) cursor: Option<Position>,
    pub(crate) preview: Option<DragPreview>,
}

impl TrackSession {
    /// Starts dragging a new piece of `piece_type`.
    pub fn begin_drag_new(&mut self, piece_type: &str) -> Result<(), PlacementError> {
        if !self.catalog.contains(piece_type) {
            return Err(PlacementError::UnknownType {
                piece_type: piece_type.to_string(),
            });
        }
        self.store.check_start(&self.catalog, piece_type, None)?;

        self.drag = Some(DragState {
            source: DragSource::New,
            piece_type: piece_type.to_string(),
            rotation: 0.0,
            cursor: None,
            preview: None,
        });
        tracing::debug!("Begin drag of new '{}'", piece_type);
        Ok(())
    }

    /// Starts repositioning a placed piece. The piece keeps its current pose
    /// in the store until the drag is confirmed.
    pub fn begin_drag_existing(&mut self, id: PieceId) -> Result<(), PlacementError> {
        let piece = self
            .store
            .get(id)
            .ok_or(PlacementError::UnknownPiece { id: id.0 })?;

        self.drag = Some(DragState {
            source: DragSource::Existing {
                id,
                original: piece.pose(),
            },
            piece_type: piece.piece_type.clone(),
            rotation: piece.heading,
            cursor: None,
            preview: None,
        });
        tracing::debug!("Begin drag of piece {}", id);
        Ok(())
    }

    /// Moves the drag cursor and re-resolves the preview.
    pub fn update_drag(&mut self, cursor: Position) -> Result<DragPreview, PlacementError> {
        let (piece_type, rotation, excluded) = {
            let drag = self.drag.as_ref().ok_or(PlacementError::NoActiveDrag)?;
            (
                drag.piece_type.clone(),
                drag.rotation,
                drag.source.existing_id(),
            )
        };
        let preview = self.evaluate_drag(&cursor, rotation, &piece_type, excluded);
        if let Some(drag) = self.drag.as_mut() {
            drag.cursor = Some(cursor);
            drag.preview = Some(preview);
        }
        Ok(preview)
    }

    /// Turns the requested rotation by `steps` rotation increments.
    ///
    /// Returns the new requested rotation.
    pub fn rotate_drag(&mut self, steps: i32) -> Result<f64, PlacementError> {
        let step = self.settings.editor.rotation_step();
        let drag = self.drag.as_mut().ok_or(PlacementError::NoActiveDrag)?;
        drag.rotation = normalize_angle(drag.rotation + step * f64::from(steps));
        let rotation = drag.rotation;

        if let Some(cursor) = drag.cursor {
            self.update_drag(cursor)?;
        }
        Ok(rotation)
    }

    /// Drops the dragged piece at its preview pose.
    ///
    /// On failure the drag stays active so the user can keep moving it.
    pub fn confirm_drag(&mut self) -> Result<PieceId, PlacementError> {
        let drag = self.drag.take().ok_or(PlacementError::NoActiveDrag)?;
        let result = match drag.preview {
            None => Err(PlacementError::NoSnapTarget),
            Some(preview) if !preview.valid => Err(PlacementError::Overlap {
                piece_type: drag.piece_type.clone(),
            }),
            Some(preview) => match &drag.source {
                DragSource::New => self.place_piece(&drag.piece_type, preview.pose),
                DragSource::Existing { id, .. } => {
                    self.move_piece(*id, preview.pose).map(|_| *id)
                }
            },
        };

        if result.is_err() {
            self.drag = Some(drag);
        }
        result
    }

    /// Abandons the drag. The piece set is left untouched.
    pub fn cancel_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(drag) => {
                tracing::debug!("Drag of '{}' cancelled", drag.piece_type);
                true
            }
            None => false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_preview(&self) -> Option<&DragPreview> {
        self.drag.as_ref().and_then(|d| d.preview.as_ref())
    }

    pub fn drag_source(&self) -> Option<&DragSource> {
        self.drag.as_ref().map(|d| &d.source)
    }

    /// Snapped pose if any candidate qualifies, otherwise a free pose at the
    /// cursor with the requested rotation.
    fn evaluate_drag(
        &self,
        cursor: &Position,
        rotation: f64,
        piece_type: &str,
        excluded: Option<PieceId>,
    ) -> DragPreview {
        if let Some(snap) = self.resolve_snap_excluding(cursor, rotation, Some(piece_type), excluded)
        {
            return DragPreview {
                pose: snap.pose(),
                snap: Some(snap),
                valid: true,
            };
        }

        let pose = Pose::new(*cursor, rotation);
        DragPreview {
            pose,
            snap: None,
            valid: self.is_placement_valid(&pose, piece_type, excluded),
        }
    }
}

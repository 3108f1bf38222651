//! Ordered storage of placed pieces.

use trackkit_core::{PieceCatalog, PieceId, PlacedPiece, PlacementError, Pose};

/// Owns the placed pieces and hands out ids.
///
/// Pieces keep insertion order, which is also the index order used by the
/// connection graph. At most one piece of the catalog's start type is stored.
#[derive(Debug, Clone)]
pub struct PieceStore {
    pieces: Vec<PlacedPiece>,
    next_id: u64,
}

impl Default for PieceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceStore {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            next_id: 1,
        }
    }

    fn generate_id(&mut self) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a piece of a known type.
    pub fn insert(
        &mut self,
        catalog: &PieceCatalog,
        piece_type: &str,
        pose: Pose,
        elevation: Option<i32>,
    ) -> Result<PieceId, PlacementError> {
        if !catalog.contains(piece_type) {
            return Err(PlacementError::UnknownType {
                piece_type: piece_type.to_string(),
            });
        }
        self.check_start(catalog, piece_type, None)?;

        let id = self.generate_id();
        let mut piece = PlacedPiece::new(id, piece_type, pose.position, pose.heading);
        piece.elevation = elevation;
        self.pieces.push(piece);
        Ok(id)
    }

    /// Re-inserts a previously removed piece at `index` (clamped), keeping its id.
    pub fn restore(&mut self, index: usize, piece: PlacedPiece) {
        self.next_id = self.next_id.max(piece.id.0 + 1);
        let index = index.min(self.pieces.len());
        self.pieces.insert(index, piece);
    }

    /// Replaces the stored piece that has the same id.
    pub fn replace(&mut self, piece: PlacedPiece) -> Result<(), PlacementError> {
        let index = self
            .index_of(piece.id)
            .ok_or(PlacementError::UnknownPiece { id: piece.id.0 })?;
        self.pieces[index] = piece;
        Ok(())
    }

    /// Replaces the whole piece list; ids are kept as given.
    pub fn replace_all(&mut self, pieces: Vec<PlacedPiece>) {
        self.next_id = pieces.iter().map(|p| p.id.0 + 1).max().unwrap_or(1);
        self.pieces = pieces;
    }

    pub fn update_pose(&mut self, id: PieceId, pose: Pose) -> Result<(), PlacementError> {
        let piece = self
            .get_mut(id)
            .ok_or(PlacementError::UnknownPiece { id: id.0 })?;
        piece.set_pose(pose);
        Ok(())
    }

    /// Removes a piece, returning its former index and value.
    pub fn remove(&mut self, id: PieceId) -> Option<(usize, PlacedPiece)> {
        let index = self.index_of(id)?;
        Some((index, self.pieces.remove(index)))
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    pub fn get(&self, id: PieceId) -> Option<&PlacedPiece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: PieceId) -> Option<&mut PlacedPiece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|p| p.id == id)
    }

    pub fn pieces(&self) -> &[PlacedPiece] {
        &self.pieces
    }

    /// Copy of the pieces with `id` filtered out; the store is not touched.
    pub fn without(&self, id: PieceId) -> Vec<PlacedPiece> {
        self.pieces.iter().filter(|p| p.id != id).cloned().collect()
    }

    pub fn start_piece(&self, catalog: &PieceCatalog) -> Option<PieceId> {
        self.pieces
            .iter()
            .find(|p| catalog.is_start(&p.piece_type))
            .map(|p| p.id)
    }

    /// Fails if adding `piece_type` would create a second start piece.
    pub fn check_start(
        &self,
        catalog: &PieceCatalog,
        piece_type: &str,
        ignoring: Option<PieceId>,
    ) -> Result<(), PlacementError> {
        if !catalog.is_start(piece_type) {
            return Ok(());
        }
        match self.start_piece(catalog) {
            Some(existing) if Some(existing) != ignoring => Err(PlacementError::DuplicateStart {
                existing: existing.0,
            }),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedPiece> {
        self.pieces.iter()
    }
}

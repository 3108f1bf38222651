//! Overlap check for candidate placements.

use trackkit_core::math::distance;
use trackkit_core::{EndpointKind, PieceCatalog, PieceId, PlacedPiece, Pose};
use trackkit_settings::ConnectionSettings;

use crate::geometry::{endpoints, piece_endpoints, PieceEndpoints};

/// Stateless validator over a borrowed piece list.
///
/// A candidate whose start or end lies within the connection threshold of an
/// existing piece's start or end is treated as connecting to that piece and is
/// not overlap-checked against it. Any other piece whose midpoint is closer
/// than the overlap threshold rejects the placement.
#[derive(Debug, Clone, Copy)]
pub struct PlacementValidator<'a> {
    pieces: &'a [PlacedPiece],
    catalog: &'a PieceCatalog,
    settings: &'a ConnectionSettings,
}

impl<'a> PlacementValidator<'a> {
    pub fn new(
        pieces: &'a [PlacedPiece],
        catalog: &'a PieceCatalog,
        settings: &'a ConnectionSettings,
    ) -> Self {
        Self {
            pieces,
            catalog,
            settings,
        }
    }

    /// Whether `piece_type` may be placed at `pose`, ignoring `except`.
    ///
    /// Unknown candidate types are never valid. Existing pieces of unknown
    /// type are ignored.
    pub fn is_valid(&self, pose: &Pose, piece_type: &str, except: Option<PieceId>) -> bool {
        if self.pieces.is_empty() {
            return true;
        }
        let Some(def) = self.catalog.get(piece_type) else {
            tracing::warn!("Placement check for unknown piece type '{}'", piece_type);
            return false;
        };
        let candidate = endpoints(pose, def);

        self.pieces
            .iter()
            .filter(|p| Some(p.id) != except)
            .filter_map(|p| piece_endpoints(p, self.catalog))
            .all(|existing| !self.overlaps(&candidate, &existing))
    }

    fn overlaps(&self, candidate: &PieceEndpoints, existing: &PieceEndpoints) -> bool {
        if self.connects(candidate, existing) {
            return false;
        }
        distance(&candidate.midpoint, &existing.midpoint) < self.settings.overlap_threshold
    }

    fn connects(&self, candidate: &PieceEndpoints, existing: &PieceEndpoints) -> bool {
        EndpointKind::BOTH.iter().any(|&ours| {
            EndpointKind::BOTH.iter().any(|&theirs| {
                distance(
                    &candidate.get(ours).position,
                    &existing.get(theirs).position,
                ) < self.settings.connection_threshold
            })
        })
    }
}

//! Snap point resolution for a piece being dragged.
//!
//! Each free endpoint near the cursor offers two attachments: one that
//! continues the track through that endpoint and one that folds back on it.
//! Continuation wins by default; turning the requested rotation toward the
//! fold-back heading selects it instead.

use smallvec::SmallVec;
use std::f64::consts::PI;
use trackkit_core::math::{angle_difference, normalize_angle, Position};
use trackkit_core::{EndpointKind, PieceCatalog, PieceDefinition, PieceId, PlacedPiece, Pose};
use trackkit_settings::ConnectionSettings;

use crate::connectivity::ConnectionGraph;
use crate::geometry::{piece_endpoints, solve_placement_for_end, solve_placement_for_start};
use crate::placement::PlacementValidator;

const HEADING_EPSILON: f64 = 1e-9;

/// How the dragged piece attaches: `<our endpoint>-to-<their endpoint>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapKind {
    /// Our start on their end, continuing forward
    StartToEnd,
    /// Our end on their end, folding back
    EndToEnd,
    /// Our end on their start, completing backward
    EndToStart,
    /// Our start on their start, folding back
    StartToStart,
}

impl SnapKind {
    /// Continuation kinds keep the direction of travel through the joint.
    pub fn is_natural(self) -> bool {
        matches!(self, Self::StartToEnd | Self::EndToStart)
    }

    pub fn ours(self) -> EndpointKind {
        match self {
            Self::StartToEnd | Self::StartToStart => EndpointKind::Start,
            Self::EndToEnd | Self::EndToStart => EndpointKind::End,
        }
    }

    pub fn theirs(self) -> EndpointKind {
        match self {
            Self::StartToEnd | Self::EndToEnd => EndpointKind::End,
            Self::EndToStart | Self::StartToStart => EndpointKind::Start,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartToEnd => "start-to-end",
            Self::EndToEnd => "end-to-end",
            Self::EndToStart => "end-to-start",
            Self::StartToStart => "start-to-start",
        }
    }
}

impl std::fmt::Display for SnapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed pose for the dragged piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub position: Position,
    pub heading: f64,
    /// Cursor distance to the matched endpoint
    pub distance: f64,
    pub kind: SnapKind,
    pub target_index: usize,
    pub target_id: PieceId,
    pub valid: bool,
}

impl SnapCandidate {
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.heading)
    }

    fn same_target(&self, other: &SnapCandidate) -> bool {
        self.target_index == other.target_index && self.kind.theirs() == other.kind.theirs()
    }
}

/// Resolves snap targets against a fixed piece list and its graph.
///
/// The piece being repositioned must already be filtered out of `pieces`
/// (and `graph` built from that filtered list).
pub struct SnapResolver<'a> {
    pieces: &'a [PlacedPiece],
    graph: &'a ConnectionGraph,
    catalog: &'a PieceCatalog,
    settings: &'a ConnectionSettings,
}

impl<'a> SnapResolver<'a> {
    pub fn new(
        pieces: &'a [PlacedPiece],
        graph: &'a ConnectionGraph,
        catalog: &'a PieceCatalog,
        settings: &'a ConnectionSettings,
    ) -> Self {
        Self {
            pieces,
            graph,
            catalog,
            settings,
        }
    }

    /// Best attachment for `dragged_type` near `cursor`, or `None`.
    ///
    /// Returns `None` without a dragged type or when no candidate survives
    /// the placement check.
    pub fn resolve(
        &self,
        cursor: &Position,
        requested_rotation: f64,
        dragged_type: Option<&str>,
    ) -> Option<SnapCandidate> {
        let dragged_type = dragged_type?;
        let def = self.catalog.get(dragged_type)?;
        let candidates = self.valid_candidates(cursor, def, dragged_type);

        // Only candidates within the tie margin of the closest one compete
        let nearest = candidates.iter().map(|c| c.distance).reduce(f64::min)?;
        let margin = self.settings.distance_tie_margin;
        let best = candidates
            .into_iter()
            .filter(|c| c.distance - nearest <= margin)
            .reduce(|best, c| {
                if self.prefers(&c, &best, requested_rotation) {
                    c
                } else {
                    best
                }
            });

        if let Some(c) = &best {
            tracing::debug!(
                "Snap resolved to {} on piece {} at distance {:.2}",
                c.kind,
                c.target_id,
                c.distance
            );
        }
        best
    }

    /// Every candidate that passes the placement check, in generation order.
    pub fn candidates(&self, cursor: &Position, dragged_type: &str) -> Vec<SnapCandidate> {
        match self.catalog.get(dragged_type) {
            Some(def) => self.valid_candidates(cursor, def, dragged_type),
            None => Vec::new(),
        }
    }

    fn valid_candidates(
        &self,
        cursor: &Position,
        def: &PieceDefinition,
        dragged_type: &str,
    ) -> Vec<SnapCandidate> {
        let validator = PlacementValidator::new(self.pieces, self.catalog, self.settings);
        let mut out = Vec::new();

        for (index, piece) in self.pieces.iter().enumerate() {
            let Some(ends) = piece_endpoints(piece, self.catalog) else {
                continue;
            };
            for theirs in EndpointKind::BOTH {
                if self.graph.is_occupied(index, theirs) {
                    continue;
                }
                let target = ends.get(theirs);
                let d = horizontal_distance(cursor, &target.position);
                if d > self.settings.snap_distance {
                    continue;
                }

                for mut c in attachments(target, theirs, def) {
                    c.distance = d;
                    c.target_index = index;
                    c.target_id = piece.id;
                    c.valid = validator.is_valid(&c.pose(), dragged_type, Some(piece.id));
                    if c.valid {
                        out.push(c);
                    }
                }
            }
        }
        out
    }

    /// True if `a` should be chosen over `b`. Both are within the tie
    /// margin of the closest candidate.
    fn prefers(&self, a: &SnapCandidate, b: &SnapCandidate, requested: f64) -> bool {
        if a.same_target(b) && a.kind.is_natural() != b.kind.is_natural() {
            let fold_back = if a.kind.is_natural() { b } else { a };
            let captured = angle_difference(requested, fold_back.heading).abs()
                <= self.settings.reversal_capture_angle();
            return if captured {
                !a.kind.is_natural()
            } else {
                a.kind.is_natural()
            };
        }

        let ha = angle_difference(requested, a.heading).abs();
        let hb = angle_difference(requested, b.heading).abs();
        if (ha - hb).abs() > HEADING_EPSILON {
            return ha < hb;
        }
        // Otherwise the closer one, then the earlier one
        a.distance < b.distance
    }
}

/// The two attachments at one free endpoint.
fn attachments(
    target: &Pose,
    theirs: EndpointKind,
    def: &PieceDefinition,
) -> SmallVec<[SnapCandidate; 2]> {
    let flipped = Pose::new(target.position, normalize_angle(target.heading + PI));
    let (natural, fold_back) = match theirs {
        EndpointKind::End => (
            (SnapKind::StartToEnd, solve_placement_for_start(target)),
            (SnapKind::EndToEnd, solve_placement_for_end(&flipped, def)),
        ),
        EndpointKind::Start => (
            (SnapKind::EndToStart, solve_placement_for_end(target, def)),
            (SnapKind::StartToStart, solve_placement_for_start(&flipped)),
        ),
    };

    [natural, fold_back]
        .into_iter()
        .map(|(kind, pose)| SnapCandidate {
            position: pose.position,
            heading: pose.heading,
            distance: 0.0,
            kind,
            target_index: 0,
            target_id: PieceId(0),
            valid: false,
        })
        .collect()
}

/// Cursor positions come from a ground-plane projection, so elevation is ignored.
fn horizontal_distance(a: &Position, b: &Position) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

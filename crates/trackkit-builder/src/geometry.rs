//! Endpoint geometry for straight and curved pieces.
//!
//! Every function here is pure. Local space has the piece start at the origin
//! facing +Z; world space is reached by rotating about the vertical axis by the
//! piece heading and translating by the piece position.
//!
//! A curve's center sits at `direction * radius` on local X. The point at arc
//! fraction `t` is that center plus the start offset swept by `curve_angle * t`,
//! and its heading is `-curve_angle * direction * t`.

use nalgebra::Vector3;
use trackkit_core::math::{normalize_angle, rotate_by_heading, Position};
use trackkit_core::{EndpointKind, PieceCatalog, PieceDefinition, PlacedPiece, Pose};

/// Start, end and centerline midpoint of a placed piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceEndpoints {
    pub start: Pose,
    pub end: Pose,
    pub midpoint: Position,
}

impl PieceEndpoints {
    pub fn get(&self, kind: EndpointKind) -> &Pose {
        match kind {
            EndpointKind::Start => &self.start,
            EndpointKind::End => &self.end,
        }
    }
}

/// Local offset and heading change at arc fraction `t` in `[0, 1]`.
pub fn local_point_at(def: &PieceDefinition, t: f64) -> (Vector3<f64>, f64) {
    if def.is_curve() {
        let dir = def.direction_sign();
        let radius = def.curve_radius;
        let swept = def.curve_angle * t;
        let offset = Vector3::new(dir * radius * (1.0 - swept.cos()), 0.0, radius * swept.sin());
        (offset, -swept * dir)
    } else {
        (Vector3::new(0.0, 0.0, def.length * t), 0.0)
    }
}

/// End pose of a piece anchored at the origin with heading 0.
pub fn local_endpoint_of(def: &PieceDefinition) -> Pose {
    let (offset, heading) = local_point_at(def, 1.0);
    Pose::new(Position::from(offset), heading)
}

/// World pose at arc fraction `t` of a piece placed at `pose`.
pub fn world_point_at(pose: &Pose, def: &PieceDefinition, t: f64) -> Pose {
    let (offset, heading) = local_point_at(def, t);
    Pose::new(
        pose.position + rotate_by_heading(&offset, pose.heading),
        normalize_angle(pose.heading + heading),
    )
}

/// World end pose of a piece placed at `pose`.
pub fn endpoint_of(pose: &Pose, def: &PieceDefinition) -> Pose {
    world_point_at(pose, def, 1.0)
}

/// Start, end and midpoint of a piece placed at `pose`.
pub fn endpoints(pose: &Pose, def: &PieceDefinition) -> PieceEndpoints {
    PieceEndpoints {
        start: Pose::new(pose.position, normalize_angle(pose.heading)),
        end: endpoint_of(pose, def),
        midpoint: world_point_at(pose, def, 0.5).position,
    }
}

/// Endpoints of a placed piece, or `None` if its type is not in the catalog.
pub fn piece_endpoints(piece: &PlacedPiece, catalog: &PieceCatalog) -> Option<PieceEndpoints> {
    let def = catalog.get(&piece.piece_type)?;
    Some(endpoints(&piece.pose(), def))
}

/// Piece pose that puts the piece's own end on `target`.
///
/// `target.heading` is the heading the piece should have at its end; the
/// piece heading is recovered by undoing the curve's turn, then the rotated
/// local end offset is subtracted from the target position.
pub fn solve_placement_for_end(target: &Pose, def: &PieceDefinition) -> Pose {
    let local_end = local_endpoint_of(def);
    let heading = normalize_angle(target.heading - local_end.heading);
    let offset = rotate_by_heading(&local_end.position.coords, heading);
    Pose::new(target.position - offset, heading)
}

/// Piece pose that puts the piece's own start on `target`.
pub fn solve_placement_for_start(target: &Pose) -> Pose {
    Pose::new(target.position, normalize_angle(target.heading))
}

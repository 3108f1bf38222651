//! Placed-piece vocabulary shared by the builder and persistence layers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::Position;

/// Stable identifier of a placed piece.
///
/// Ids are compared by value and never reused within a store, so they stay
/// valid across reordering and removal of other pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u64);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two connection points of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Start,
    End,
}

impl EndpointKind {
    pub const BOTH: [EndpointKind; 2] = [EndpointKind::Start, EndpointKind::End];

    /// The other endpoint of the same piece.
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// World position plus heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Position,
    pub heading: f64,
}

impl Pose {
    pub fn new(position: Position, heading: f64) -> Self {
        Self { position, heading }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Position::origin(),
            heading: 0.0,
        }
    }
}

/// A piece instance placed in the world.
///
/// The visual representation lives with the renderer; it is keyed by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPiece {
    pub id: PieceId,
    pub piece_type: String,
    pub position: Position,
    pub heading: f64,
    pub elevation: Option<i32>,
}

impl PlacedPiece {
    pub fn new(id: PieceId, piece_type: impl Into<String>, position: Position, heading: f64) -> Self {
        Self {
            id,
            piece_type: piece_type.into(),
            position,
            heading,
            elevation: None,
        }
    }

    /// Builder-style elevation level.
    pub fn with_elevation(mut self, level: i32) -> Self {
        self.elevation = Some(level);
        self
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.heading)
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.heading = pose.heading;
    }
}

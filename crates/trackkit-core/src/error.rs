//! Error handling for TrackKit
//!
//! Provides error types for every layer of the track builder:
//! - Catalog errors (piece definitions)
//! - Placement errors (interactive editing)
//! - Race errors (race-mode gating)
//! - Persistence errors (saved track files)
//!
//! All error types use `thiserror` for ergonomic error handling. None of these
//! conditions is fatal: each one only blocks the operation that raised it.

use thiserror::Error;

/// Catalog error type
///
/// Raised while building or querying a piece catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Two piece types both claim to be the start piece
    #[error("Piece types '{first}' and '{second}' are both flagged as start pieces")]
    DuplicateStartType {
        /// The start type registered first.
        first: String,
        /// The conflicting start type.
        second: String,
    },

    /// A piece type was registered twice
    #[error("Piece type '{piece_type}' is defined more than once")]
    DuplicateType {
        /// The repeated type identifier.
        piece_type: String,
    },

    /// Definition parameters are out of range
    #[error("Invalid definition for '{piece_type}': {reason}")]
    InvalidDefinition {
        /// The offending type identifier.
        piece_type: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// Catalog file could not be parsed
    #[error("Failed to parse catalog: {reason}")]
    Parse {
        /// The parser message.
        reason: String,
    },
}

/// Placement error type
///
/// Represents rejected edits to the placed-piece set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// The requested piece type is not in the catalog
    #[error("Unknown piece type: {piece_type}")]
    UnknownType {
        /// The unknown type identifier.
        piece_type: String,
    },

    /// The piece would overlap an existing piece
    #[error("Placement of '{piece_type}' overlaps an existing piece")]
    Overlap {
        /// The type being placed.
        piece_type: String,
    },

    /// A start piece already exists in the track
    #[error("Track already has a start piece (id {existing})")]
    DuplicateStart {
        /// Id of the start piece already placed.
        existing: u64,
    },

    /// No piece with this id is placed
    #[error("No placed piece with id {id}")]
    UnknownPiece {
        /// The missing piece id.
        id: u64,
    },

    /// A drag operation was expected but none is active
    #[error("No drag in progress")]
    NoActiveDrag,

    /// The active drag has no snap target to confirm
    #[error("Dragged piece has no valid snap position")]
    NoSnapTarget,
}

/// Race error type
///
/// Race mode requires a start piece and a closed loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaceError {
    /// No piece flagged as start is placed
    #[error("Track has no start piece")]
    NoStartPiece,

    /// The traversal from the start piece does not return to it
    #[error("Track is not a closed loop ({visited} pieces reachable from start)")]
    OpenLoop {
        /// Number of pieces reached before the walk stopped.
        visited: usize,
    },
}

/// Persistence error type
///
/// Represents failures while saving or loading a track file. A failed load
/// never leaves a partially restored track behind.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// File was written by an incompatible format version
    #[error("Unsupported track file version: expected {expected}, found {found}")]
    UnsupportedVersion {
        /// The version this build reads.
        expected: u32,
        /// The version found in the file.
        found: u32,
    },

    /// File references a piece type the catalog does not define
    #[error("Track file references unknown piece type '{piece_type}' at index {index}")]
    UnknownPieceType {
        /// Index of the offending entry in the piece list.
        index: usize,
        /// The unknown type identifier.
        piece_type: String,
    },

    /// File contains more than one start piece
    #[error("Track file contains more than one start piece (indices {first} and {second})")]
    DuplicateStart {
        /// Index of the first start piece.
        first: usize,
        /// Index of the second start piece.
        second: usize,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for TrackKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Placement error
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Race error
    #[error(transparent)]
    Race(#[from] RaceError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl Error {
    /// Check if this is a placement error
    pub fn is_placement_error(&self) -> bool {
        matches!(self, Error::Placement(_))
    }

    /// Check if this is a persistence error
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }

    /// Check if this blocks race entry
    pub fn is_race_error(&self) -> bool {
        matches!(self, Error::Race(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

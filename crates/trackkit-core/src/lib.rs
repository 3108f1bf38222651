//! # TrackKit Core
//!
//! Core types and utilities for TrackKit.
//! Provides the piece catalog, placed-piece vocabulary, angle helpers and the
//! error types shared by the settings and builder crates.

pub mod catalog;
pub mod error;
pub mod math;
pub mod types;

pub use catalog::{PieceCatalog, PieceDefinition};

pub use error::{CatalogError, Error, PersistenceError, PlacementError, RaceError, Result};

pub use math::{angle_difference, normalize_angle, smootherstep, Position};

pub use types::{EndpointKind, PieceId, PlacedPiece, Pose};

//! # TrackKit
//!
//! Snap-together race track assembly with support for:
//! - Straight, curved and banked track pieces from a piece catalog
//! - Interactive snapping with continuation and fold-back attachments
//! - Closed-loop detection from a single start piece
//! - Centripetal Catmull-Rom racing lines with lap progress queries
//!
//! ## Architecture
//!
//! TrackKit is organized as a workspace with multiple crates:
//!
//! 1. **trackkit-core** - Piece catalog, placed-piece types, angle helpers, errors
//! 2. **trackkit-settings** - Tolerances and sampling parameters (JSON/TOML)
//! 3. **trackkit-builder** - Connectivity, traversal, snapping, racing line, session
//! 4. **trackkit** - Re-exports, logging setup and the command line tool

pub use trackkit_builder as builder;

pub use trackkit_core::{
    CatalogError, EndpointKind, Error, PersistenceError, PieceCatalog, PieceDefinition, PieceId,
    PlacedPiece, PlacementError, Pose, Position, RaceError, Result,
};

pub use trackkit_settings::{SettingsError, TrackSettings};

pub use trackkit_builder::{
    BankProfile, ConnectionGraph, DragPreview, GeometrySink, RacingLine, SnapCandidate, SnapKind,
    TrackFile, TrackObserver, TrackSession, TrackStatus, TraversalResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting, or JSON lines when
///   `TRACKKIT_LOG_FORMAT=json`
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("TRACKKIT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

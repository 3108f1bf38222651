//! Track session: the single owner of the editable track.
//!
//! This module is split into submodules:
//! - `drag`: Interactive drag, snap preview and drop
//! - `history`: Undo/redo functionality
//! - `file_io`: Save/load operations
//!
//! Every structural edit goes through [`TrackSession::rebuild`], which
//! recomputes the connection graph and traversal from scratch. The racing
//! line and banking profiles are refreshed only when connectivity changed,
//! a traversed piece moved, or race mode is entered.

mod drag;
mod file_io;
mod history;

pub use drag::{DragPreview, DragSource};
pub use history::TrackCommand;

use std::path::PathBuf;
use trackkit_core::math::Position;
use trackkit_core::{PieceCatalog, PieceId, PlacedPiece, PlacementError, Pose, RaceError};
use trackkit_settings::TrackSettings;

use crate::banking::{smooth_banked_transitions, BankProfile, BankedTransitionSmoother, GeometrySink};
use crate::connectivity::ConnectionGraph;
use crate::piece_store::PieceStore;
use crate::placement::PlacementValidator;
use crate::racing_line::RacingLine;
use crate::serialization::TrackMetadata;
use crate::snap::{SnapCandidate, SnapResolver};
use crate::traversal::{traverse, TraversalResult};

use drag::DragState;

/// Plain-data summary of the track, published after every rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStatus {
    pub piece_count: usize,
    pub has_start: bool,
    pub closed: bool,
    /// Pieces reached by the traversal
    pub traversal_length: usize,
    /// Racing line length, when one exists
    pub lap_length: Option<f64>,
}

impl TrackStatus {
    pub fn can_race(&self) -> bool {
        self.has_start && self.closed
    }
}

/// Receives track status updates (status text, race button state, ...).
pub trait TrackObserver {
    fn on_status(&mut self, status: &TrackStatus);
}

/// Editable track with its derived connectivity, traversal and racing line.
pub struct TrackSession {
    catalog: PieceCatalog,
    settings: TrackSettings,
    store: PieceStore,
    graph: ConnectionGraph,
    traversal: TraversalResult,
    racing_line: Option<RacingLine>,
    bank_profiles: Vec<BankProfile>,
    smoother: BankedTransitionSmoother,
    /// Racing line must be refreshed on the next rebuild
    line_stale: bool,
    pub(crate) drag: Option<DragState>,
    pub(crate) undo_stack: Vec<TrackCommand>,
    pub(crate) redo_stack: Vec<TrackCommand>,
    observers: Vec<Box<dyn TrackObserver>>,
    geometry_sink: Option<Box<dyn GeometrySink>>,
    pub(crate) metadata: Option<TrackMetadata>,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    pub name: String,
}

impl Default for TrackSession {
    fn default() -> Self {
        Self::new(PieceCatalog::standard(), TrackSettings::default())
    }
}

impl TrackSession {
    /// Creates an empty session.
    pub fn new(catalog: PieceCatalog, settings: TrackSettings) -> Self {
        Self {
            catalog,
            settings,
            store: PieceStore::new(),
            graph: ConnectionGraph::default(),
            traversal: TraversalResult::empty(),
            racing_line: None,
            bank_profiles: Vec::new(),
            smoother: BankedTransitionSmoother::new(),
            line_stale: false,
            drag: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            observers: Vec::new(),
            geometry_sink: None,
            metadata: None,
            current_file_path: None,
            is_modified: false,
            name: "Untitled".to_string(),
        }
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &TrackSettings {
        &self.settings
    }

    pub fn store(&self) -> &PieceStore {
        &self.store
    }

    pub fn pieces(&self) -> &[PlacedPiece] {
        self.store.pieces()
    }

    pub fn piece(&self, id: PieceId) -> Option<&PlacedPiece> {
        self.store.get(id)
    }

    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    pub fn traversal(&self) -> &TraversalResult {
        &self.traversal
    }

    pub fn racing_line(&self) -> Option<&RacingLine> {
        self.racing_line.as_ref()
    }

    pub fn bank_profiles(&self) -> &[BankProfile] {
        &self.bank_profiles
    }

    /// Bank profile of a placed piece, if it is a traversed banked curve.
    pub fn bank_profile(&self, id: PieceId) -> Option<&BankProfile> {
        self.bank_profiles.iter().find(|p| p.piece_id == id)
    }

    pub fn add_observer(&mut self, observer: Box<dyn TrackObserver>) {
        self.observers.push(observer);
        tracing::debug!("Registered track observer #{}", self.observers.len());
    }

    pub fn set_geometry_sink(&mut self, sink: Box<dyn GeometrySink>) {
        self.geometry_sink = Some(sink);
    }

    /// Whether `piece_type` may be placed at `pose`, ignoring `except`.
    pub fn is_placement_valid(&self, pose: &Pose, piece_type: &str, except: Option<PieceId>) -> bool {
        PlacementValidator::new(self.store.pieces(), &self.catalog, &self.settings.connection)
            .is_valid(pose, piece_type, except)
    }

    /// Best attachment near `cursor` against the whole track.
    pub fn resolve_snap(
        &self,
        cursor: &Position,
        requested_rotation: f64,
        dragged_type: Option<&str>,
    ) -> Option<SnapCandidate> {
        self.resolve_snap_excluding(cursor, requested_rotation, dragged_type, None)
    }

    /// Best attachment near `cursor` with `excluded` filtered out of both the
    /// graph and the placement check for this one call.
    ///
    /// The returned `target_index` always indexes [`pieces`](Self::pieces).
    pub fn resolve_snap_excluding(
        &self,
        cursor: &Position,
        requested_rotation: f64,
        dragged_type: Option<&str>,
        excluded: Option<PieceId>,
    ) -> Option<SnapCandidate> {
        let connection = &self.settings.connection;
        match excluded.filter(|id| self.store.get(*id).is_some()) {
            Some(id) => {
                let pieces = self.store.without(id);
                let graph = ConnectionGraph::build(&pieces, &self.catalog, connection.link_tolerance);
                let mut snap = SnapResolver::new(&pieces, &graph, &self.catalog, connection)
                    .resolve(cursor, requested_rotation, dragged_type)?;
                snap.target_index = self.store.index_of(snap.target_id)?;
                Some(snap)
            }
            None => SnapResolver::new(self.store.pieces(), &self.graph, &self.catalog, connection)
                .resolve(cursor, requested_rotation, dragged_type),
        }
    }

    /// Places a new piece after checking its type, overlap and the single
    /// start rule.
    pub fn place_piece(&mut self, piece_type: &str, pose: Pose) -> Result<PieceId, PlacementError> {
        if !self.catalog.contains(piece_type) {
            return Err(PlacementError::UnknownType {
                piece_type: piece_type.to_string(),
            });
        }
        if !self.is_placement_valid(&pose, piece_type, None) {
            return Err(PlacementError::Overlap {
                piece_type: piece_type.to_string(),
            });
        }

        let id = self.store.insert(&self.catalog, piece_type, pose, None)?;
        if let Some((index, piece)) = self.store.index_of(id).zip(self.store.get(id).cloned()) {
            self.push_command(TrackCommand::Place { index, piece });
        }
        tracing::info!("Placed '{}' as piece {}", piece_type, id);
        self.rebuild();
        Ok(id)
    }

    /// Repositions a placed piece.
    pub fn move_piece(&mut self, id: PieceId, pose: Pose) -> Result<(), PlacementError> {
        let before = self
            .store
            .get(id)
            .cloned()
            .ok_or(PlacementError::UnknownPiece { id: id.0 })?;
        if !self.is_placement_valid(&pose, &before.piece_type, Some(id)) {
            return Err(PlacementError::Overlap {
                piece_type: before.piece_type,
            });
        }

        let mut after = before.clone();
        after.set_pose(pose);
        self.commit_update(before, after)?;
        tracing::info!("Moved piece {}", id);
        Ok(())
    }

    /// Sets the discrete elevation level; the piece height follows it.
    pub fn set_elevation(&mut self, id: PieceId, level: Option<i32>) -> Result<(), PlacementError> {
        let before = self
            .store
            .get(id)
            .cloned()
            .ok_or(PlacementError::UnknownPiece { id: id.0 })?;

        let mut after = before.clone();
        after.elevation = level;
        after.position.y = f64::from(level.unwrap_or(0)) * self.settings.editor.level_height;
        if !self.is_placement_valid(&after.pose(), &after.piece_type, Some(id)) {
            return Err(PlacementError::Overlap {
                piece_type: after.piece_type,
            });
        }
        self.commit_update(before, after)?;
        tracing::info!("Piece {} elevation set to {:?}", id, level);
        Ok(())
    }

    fn commit_update(&mut self, before: PlacedPiece, after: PlacedPiece) -> Result<(), PlacementError> {
        self.store.replace(after.clone())?;
        if self.is_traversed(after.id) {
            self.line_stale = true;
        }
        self.push_command(TrackCommand::Move { before, after });
        self.rebuild();
        Ok(())
    }

    /// Removes a placed piece.
    pub fn remove_piece(&mut self, id: PieceId) -> Result<PlacedPiece, PlacementError> {
        if self.drag.as_ref().and_then(|d| d.source.existing_id()) == Some(id) {
            self.drag = None;
        }
        let (index, piece) = self
            .store
            .remove(id)
            .ok_or(PlacementError::UnknownPiece { id: id.0 })?;
        self.push_command(TrackCommand::Remove {
            index,
            piece: piece.clone(),
        });
        tracing::info!("Removed piece {} ('{}')", id, piece.piece_type);
        self.rebuild();
        Ok(piece)
    }

    /// Starts a new, empty track.
    pub fn clear(&mut self) {
        self.drag = None;
        self.store.clear();
        self.clear_history();
        self.smoother.clear();
        self.metadata = None;
        self.current_file_path = None;
        self.is_modified = false;
        self.name = "Untitled".to_string();
        self.line_stale = true;
        tracing::info!("Track cleared");
        self.rebuild();
    }

    fn is_traversed(&self, id: PieceId) -> bool {
        let pieces = self.store.pieces();
        self.traversal
            .steps
            .iter()
            .any(|s| pieces.get(s.piece).is_some_and(|p| p.id == id))
    }

    /// Recomputes connectivity and traversal and publishes the new status.
    pub fn rebuild(&mut self) -> TrackStatus {
        let pieces = self.store.pieces();
        let graph = ConnectionGraph::build(
            pieces,
            &self.catalog,
            self.settings.connection.link_tolerance,
        );
        let traversal = traverse(&graph, pieces, &self.catalog);
        let connectivity_changed = graph != self.graph || traversal != self.traversal;
        tracing::debug!(
            "Rebuilt connectivity: {} pieces, {} links, traversal {} (closed: {})",
            graph.len(),
            graph.link_count(),
            traversal.len(),
            traversal.closed
        );

        self.graph = graph;
        self.traversal = traversal;
        if connectivity_changed || self.line_stale {
            self.refresh_racing_line();
        }

        let status = self.status();
        for observer in &mut self.observers {
            observer.on_status(&status);
        }
        status
    }

    /// Rebuilds the racing line and re-applies banked transitions.
    fn refresh_racing_line(&mut self) {
        let pieces = self.store.pieces();
        self.racing_line = RacingLine::build(
            &self.traversal,
            pieces,
            &self.catalog,
            &self.settings.racing_line,
        );
        self.bank_profiles =
            smooth_banked_transitions(&self.traversal, pieces, &self.catalog, &self.settings.banking);
        self.smoother
            .apply(&self.bank_profiles, self.geometry_sink.as_deref_mut());
        self.line_stale = false;
    }

    pub fn status(&self) -> TrackStatus {
        TrackStatus {
            piece_count: self.store.len(),
            has_start: self.traversal.has_start(),
            closed: self.traversal.closed,
            traversal_length: self.traversal.len(),
            lap_length: self.racing_line.as_ref().map(RacingLine::length),
        }
    }

    /// Rebuilds everything and returns the racing line if the track is a
    /// closed loop through the start piece.
    pub fn enter_race_mode(&mut self) -> Result<&RacingLine, RaceError> {
        self.drag = None;
        self.line_stale = true;
        let status = self.rebuild();

        if !status.has_start {
            tracing::warn!("Race mode refused: no start piece");
            return Err(RaceError::NoStartPiece);
        }
        if !status.closed {
            tracing::warn!(
                "Race mode refused: track is open after {} pieces",
                status.traversal_length
            );
            return Err(RaceError::OpenLoop {
                visited: status.traversal_length,
            });
        }

        tracing::info!(
            "Entering race mode: {} pieces, lap length {:.1}",
            status.traversal_length,
            status.lap_length.unwrap_or(0.0)
        );
        self.racing_line.as_ref().ok_or(RaceError::OpenLoop {
            visited: status.traversal_length,
        })
    }
}

//! # TrackKit Builder
//!
//! Assembly of placed track pieces into a raceable loop.
//!
//! ## Core Components
//!
//! - **Geometry**: Start/end/midpoint poses of straight and curved pieces
//! - **Connectivity**: Symmetric endpoint links within a distance tolerance
//! - **Traversal**: Ordered walk from the start piece with loop detection
//! - **Placement**: Overlap check that exempts genuine connections
//! - **Snapping**: Attachment candidates and tie-break policy while dragging
//! - **Racing Line**: Centripetal Catmull-Rom spline through the traversal
//! - **Banking**: Transition flags and bank profiles for banked curves
//! - **Session**: Store, history, persistence and status publishing
//!
//! ## Architecture
//!
//! ```text
//! PieceCatalog
//!   └── Geometry
//!         ├── ConnectionGraph ── traverse ──┬── RacingLine
//!         ├── PlacementValidator            └── BankProfile
//!         └── SnapResolver
//! ```
//!
//! The graph, traversal, racing line and bank profiles are pure functions of
//! the placed pieces. [`TrackSession`] owns the pieces and recomputes the
//! derived data after each structural edit.

pub mod banking;
pub mod connectivity;
pub mod geometry;
pub mod piece_store;
pub mod placement;
pub mod racing_line;
pub mod serialization;
pub mod session;
pub mod snap;
pub mod traversal;

pub use banking::{
    smooth_banked_transitions, BankProfile, BankedTransitionSmoother, GeometrySink,
};
pub use connectivity::{ConnectionGraph, Link, NodeLinks};
pub use geometry::{
    endpoint_of, endpoints, local_endpoint_of, piece_endpoints, solve_placement_for_end,
    solve_placement_for_start, PieceEndpoints,
};
pub use piece_store::PieceStore;
pub use placement::PlacementValidator;
pub use racing_line::{CatmullRomCurve, RacingLine};
pub use serialization::{PieceRecord, PositionRecord, TrackFile, TrackMetadata, FORMAT_VERSION};
pub use session::{DragPreview, DragSource, TrackCommand, TrackObserver, TrackSession, TrackStatus};
pub use snap::{SnapCandidate, SnapKind, SnapResolver};
pub use traversal::{find_start, traverse, TraversalResult, TraversalStep, WalkEnd};

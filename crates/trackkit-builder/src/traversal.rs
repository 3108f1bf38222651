//! Ordered walk of the connection graph from the start piece.

use trackkit_core::{EndpointKind, PieceCatalog, PlacedPiece};

use crate::connectivity::ConnectionGraph;

/// Pieces visited before a return to start counts as a loop.
pub const MIN_LOOP_PIECES: usize = 3;

/// One visited piece.
///
/// `reversed` means the piece was entered through its end and traveled toward
/// its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStep {
    pub piece: usize,
    pub reversed: bool,
}

impl TraversalStep {
    /// Endpoint the walk entered through.
    pub fn entry(&self) -> EndpointKind {
        if self.reversed {
            EndpointKind::End
        } else {
            EndpointKind::Start
        }
    }

    /// Endpoint the walk leaves through.
    pub fn exit(&self) -> EndpointKind {
        self.entry().opposite()
    }
}

/// Why the walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// No start piece placed
    NoStart,
    /// The exit endpoint of the last piece has no link
    Dangling,
    /// Linked back to the start piece
    ReturnedToStart,
    /// Linked to an already-visited piece that is not the start
    Revisit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalResult {
    pub steps: Vec<TraversalStep>,
    pub closed: bool,
    /// Index of the start piece, if one is placed
    pub start: Option<usize>,
    pub ended_by: WalkEnd,
}

impl TraversalResult {
    /// No start piece: open, nothing visited.
    pub fn empty() -> Self {
        Self {
            steps: Vec::new(),
            closed: false,
            start: None,
            ended_by: WalkEnd::NoStart,
        }
    }

    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Neighbor before `i`, wrapping around on closed loops.
    pub fn previous(&self, i: usize) -> Option<&TraversalStep> {
        if i > 0 {
            self.steps.get(i - 1)
        } else if self.closed {
            self.steps.last()
        } else {
            None
        }
    }

    /// Neighbor after `i`, wrapping around on closed loops.
    pub fn next(&self, i: usize) -> Option<&TraversalStep> {
        if i + 1 < self.steps.len() {
            self.steps.get(i + 1)
        } else if self.closed {
            self.steps.first()
        } else {
            None
        }
    }
}

impl Default for TraversalResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Index of the first piece whose type is the catalog's start type.
pub fn find_start(pieces: &[PlacedPiece], catalog: &PieceCatalog) -> Option<usize> {
    pieces.iter().position(|p| catalog.is_start(&p.piece_type))
}

/// Walks from the start piece, leaving each piece through the endpoint
/// opposite the one it was entered by.
///
/// Visits each piece at most once, so it halts within `graph.len()` steps.
pub fn traverse(graph: &ConnectionGraph, pieces: &[PlacedPiece], catalog: &PieceCatalog) -> TraversalResult {
    let Some(start) = find_start(pieces, catalog) else {
        tracing::debug!("Traversal skipped: no start piece");
        return TraversalResult::empty();
    };
    if start >= graph.len() {
        tracing::warn!("Start piece index {} outside graph of {}", start, graph.len());
        return TraversalResult::empty();
    }

    let mut visited = vec![false; graph.len()];
    let mut steps = Vec::new();
    let mut current = TraversalStep {
        piece: start,
        reversed: false,
    };

    let ended_by = loop {
        visited[current.piece] = true;
        steps.push(current);

        let Some(link) = graph.link(current.piece, current.exit()) else {
            break WalkEnd::Dangling;
        };
        if link.piece == start {
            break WalkEnd::ReturnedToStart;
        }
        if visited[link.piece] {
            tracing::warn!(
                "Traversal revisited piece index {} before reaching start",
                link.piece
            );
            break WalkEnd::Revisit;
        }
        current = TraversalStep {
            piece: link.piece,
            reversed: link.endpoint == EndpointKind::End,
        };
    };

    let closed = ended_by == WalkEnd::ReturnedToStart && steps.len() >= MIN_LOOP_PIECES;
    tracing::debug!(
        "Traversal visited {} pieces, closed: {}, ended by {:?}",
        steps.len(),
        closed,
        ended_by
    );

    TraversalResult {
        steps,
        closed,
        start: Some(start),
        ended_by,
    }
}

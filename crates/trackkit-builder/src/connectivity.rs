//! Connectivity graph over placed pieces.
//!
//! The graph is always rebuilt from scratch from the full piece list; it is
//! never patched incrementally. Links are indexed by position in the slice the
//! graph was built from.
//!
//! When one endpoint is within tolerance of several others, the nearest pair
//! wins: all qualifying endpoint pairs are ordered by distance (then by index)
//! and linked greedily while both endpoints are still free. This keeps every
//! link symmetric and every endpoint at most singly linked, independent of the
//! order pieces were placed in.

use trackkit_core::math::distance;
use trackkit_core::{EndpointKind, PieceCatalog, PlacedPiece};

use crate::geometry::{piece_endpoints, PieceEndpoints};

/// Target of a link: which piece and which of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub piece: usize,
    pub endpoint: EndpointKind,
}

/// Links at a single piece's two endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeLinks {
    pub start: Option<Link>,
    pub end: Option<Link>,
}

impl NodeLinks {
    pub fn get(&self, endpoint: EndpointKind) -> Option<Link> {
        match endpoint {
            EndpointKind::Start => self.start,
            EndpointKind::End => self.end,
        }
    }

    fn slot_mut(&mut self, endpoint: EndpointKind) -> &mut Option<Link> {
        match endpoint {
            EndpointKind::Start => &mut self.start,
            EndpointKind::End => &mut self.end,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LinkCandidate {
    distance: f64,
    a: usize,
    a_end: EndpointKind,
    b: usize,
    b_end: EndpointKind,
}

/// Symmetric adjacency between piece endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionGraph {
    nodes: Vec<NodeLinks>,
}

impl ConnectionGraph {
    /// Graph with one unlinked node per piece.
    pub fn with_len(len: usize) -> Self {
        Self {
            nodes: vec![NodeLinks::default(); len],
        }
    }

    /// Links every endpoint pair closer than `tolerance`.
    ///
    /// Pieces of unknown type get a node with no links.
    pub fn build(pieces: &[PlacedPiece], catalog: &PieceCatalog, tolerance: f64) -> Self {
        let endpoints: Vec<Option<PieceEndpoints>> = pieces
            .iter()
            .map(|piece| {
                let ends = piece_endpoints(piece, catalog);
                if ends.is_none() {
                    tracing::warn!(
                        "Piece {} has unknown type '{}', left unlinked",
                        piece.id,
                        piece.piece_type
                    );
                }
                ends
            })
            .collect();

        let mut candidates = Vec::new();
        for (a, ends_a) in endpoints.iter().enumerate() {
            let Some(ends_a) = ends_a else { continue };
            for (b, ends_b) in endpoints.iter().enumerate().skip(a + 1) {
                let Some(ends_b) = ends_b else { continue };
                for a_end in EndpointKind::BOTH {
                    for b_end in EndpointKind::BOTH {
                        let d = distance(
                            &ends_a.get(a_end).position,
                            &ends_b.get(b_end).position,
                        );
                        if d < tolerance {
                            candidates.push(LinkCandidate {
                                distance: d,
                                a,
                                a_end,
                                b,
                                b_end,
                            });
                        }
                    }
                }
            }
        }

        candidates.sort_by(|x, y| {
            x.distance
                .total_cmp(&y.distance)
                .then(x.a.cmp(&y.a))
                .then(x.a_end.cmp(&y.a_end))
                .then(x.b.cmp(&y.b))
                .then(x.b_end.cmp(&y.b_end))
        });

        let mut graph = Self::with_len(pieces.len());
        for c in &candidates {
            if graph.nodes[c.a].get(c.a_end).is_some() || graph.nodes[c.b].get(c.b_end).is_some() {
                continue;
            }
            graph.connect(c.a, c.a_end, c.b, c.b_end);
        }

        tracing::debug!(
            "Built connection graph: {} pieces, {} links from {} candidates",
            pieces.len(),
            graph.link_count(),
            candidates.len()
        );
        graph
    }

    /// Writes a link pair. Both endpoints must be free and `a != b`.
    fn connect(&mut self, a: usize, a_end: EndpointKind, b: usize, b_end: EndpointKind) {
        debug_assert_ne!(a, b, "a piece cannot link to itself");
        *self.nodes[a].slot_mut(a_end) = Some(Link {
            piece: b,
            endpoint: b_end,
        });
        *self.nodes[b].slot_mut(b_end) = Some(Link {
            piece: a,
            endpoint: a_end,
        });
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, piece: usize) -> Option<&NodeLinks> {
        self.nodes.get(piece)
    }

    /// Link leaving `piece` through `endpoint`, if any.
    pub fn link(&self, piece: usize, endpoint: EndpointKind) -> Option<Link> {
        self.nodes.get(piece).and_then(|n| n.get(endpoint))
    }

    pub fn is_occupied(&self, piece: usize, endpoint: EndpointKind) -> bool {
        self.link(piece, endpoint).is_some()
    }

    /// Number of undirected links.
    pub fn link_count(&self) -> usize {
        let endpoints: usize = self
            .nodes
            .iter()
            .map(|n| n.start.is_some() as usize + n.end.is_some() as usize)
            .sum();
        endpoints / 2
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &NodeLinks)> {
        self.nodes.iter().enumerate()
    }
}

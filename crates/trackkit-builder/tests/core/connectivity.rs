use trackkit_builder::connectivity::{ConnectionGraph, Link};
use trackkit_core::{EndpointKind, PieceCatalog, PieceDefinition};

use crate::fixtures::{catalog, chain, piece, STADIUM};

const TOLERANCE: f64 = 8.0;

fn assert_symmetric(graph: &ConnectionGraph) {
    for (index, node) in graph.iter() {
        for endpoint in EndpointKind::BOTH {
            if let Some(link) = node.get(endpoint) {
                assert_ne!(link.piece, index, "piece {} links to itself", index);
                assert_eq!(
                    graph.link(link.piece, link.endpoint),
                    Some(Link {
                        piece: index,
                        endpoint
                    }),
                    "link {}.{} is not mirrored",
                    index,
                    endpoint
                );
            }
        }
    }
}

#[test]
fn test_stadium_fully_linked() {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM);
    let graph = ConnectionGraph::build(&pieces, &catalog, TOLERANCE);

    assert_eq!(graph.len(), 6);
    assert_eq!(graph.link_count(), 6);
    assert_symmetric(&graph);

    // Closing joint: last piece's end meets the start piece's start
    assert_eq!(
        graph.link(5, EndpointKind::End),
        Some(Link {
            piece: 0,
            endpoint: EndpointKind::Start
        })
    );
    assert_eq!(
        graph.link(0, EndpointKind::End),
        Some(Link {
            piece: 1,
            endpoint: EndpointKind::Start
        })
    );
}

#[test]
fn test_links_within_tolerance_only() {
    let catalog = catalog();
    let pieces = vec![
        piece(1, "straight", 0.0, 0.0, 0.0),
        // Start 7 units past the first piece's end
        piece(2, "straight", 0.0, 47.0, 0.0),
        // Start 9 units from the second piece's end
        piece(3, "straight", 0.0, 96.0, 0.0),
    ];
    let graph = ConnectionGraph::build(&pieces, &catalog, TOLERANCE);

    assert!(graph.is_occupied(0, EndpointKind::End));
    assert!(graph.is_occupied(1, EndpointKind::Start));
    assert!(!graph.is_occupied(1, EndpointKind::End));
    assert!(!graph.is_occupied(2, EndpointKind::Start));
    assert_eq!(graph.link_count(), 1);
}

#[test]
fn test_nearest_pair_wins() {
    let catalog = catalog();
    // Both candidates are within tolerance of the first piece's end at (0, 0, 40)
    let far = piece(2, "straight", -6.0, 40.0, 0.0);
    let near = piece(3, "straight", 3.0, 40.0, 0.0);
    let base = piece(1, "straight", 0.0, 0.0, 0.0);

    for pieces in [
        vec![base.clone(), far.clone(), near.clone()],
        vec![near.clone(), far.clone(), base.clone()],
    ] {
        let graph = ConnectionGraph::build(&pieces, &catalog, TOLERANCE);
        let index_of = |id: u64| pieces.iter().position(|p| p.id.0 == id).unwrap();

        let link = graph.link(index_of(1), EndpointKind::End).unwrap();
        assert_eq!(pieces[link.piece].id.0, 3);
        assert_eq!(link.endpoint, EndpointKind::Start);
        assert!(!graph.is_occupied(index_of(2), EndpointKind::Start));
        assert_symmetric(&graph);
    }
}

#[test]
fn test_endpoint_holds_single_link() {
    let catalog = catalog();
    // Three starts meeting at the origin
    let pieces = vec![
        piece(1, "straight", 0.0, 0.0, 0.0),
        piece(2, "straight", 0.0, 0.0, std::f64::consts::FRAC_PI_2),
        piece(3, "straight", 0.0, 0.0, -std::f64::consts::FRAC_PI_2),
    ];
    let graph = ConnectionGraph::build(&pieces, &catalog, TOLERANCE);

    assert_eq!(graph.link_count(), 1);
    assert_eq!(
        graph.link(0, EndpointKind::Start),
        Some(Link {
            piece: 1,
            endpoint: EndpointKind::Start
        })
    );
    assert!(!graph.is_occupied(2, EndpointKind::Start));
    assert_symmetric(&graph);
}

#[test]
fn test_short_piece_never_links_to_itself() {
    let catalog = PieceCatalog::from_definitions([("stub", PieceDefinition::straight(0.5))]).unwrap();
    let pieces = vec![piece(1, "stub", 0.0, 0.0, 0.0)];
    let graph = ConnectionGraph::build(&pieces, &catalog, TOLERANCE);

    assert_eq!(graph.link_count(), 0);
    assert!(!graph.is_occupied(0, EndpointKind::Start));
    assert!(!graph.is_occupied(0, EndpointKind::End));
}

#[test]
fn test_unknown_type_left_unlinked() {
    let catalog = catalog();
    let pieces = vec![
        piece(1, "straight", 0.0, 0.0, 0.0),
        piece(2, "monorail", 0.0, 40.0, 0.0),
    ];
    let graph = ConnectionGraph::build(&pieces, &catalog, TOLERANCE);

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.link_count(), 0);
}

#[test]
fn test_empty_input() {
    let graph = ConnectionGraph::build(&[], &catalog(), TOLERANCE);
    assert!(graph.is_empty());
    assert_eq!(graph.link_count(), 0);
}

use std::f64::consts::PI;
use trackkit_builder::connectivity::ConnectionGraph;
use trackkit_builder::traversal::{traverse, WalkEnd};
use trackkit_core::{EndpointKind, PieceCatalog, PieceDefinition, PlacedPiece};

use crate::fixtures::{catalog, chain, piece, STADIUM};

fn walk(pieces: &[PlacedPiece], catalog: &PieceCatalog) -> trackkit_builder::TraversalResult {
    let graph = ConnectionGraph::build(pieces, catalog, 8.0);
    traverse(&graph, pieces, catalog)
}

#[test]
fn test_stadium_is_closed() {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM);
    let result = walk(&pieces, &catalog);

    assert!(result.closed);
    assert!(result.has_start());
    assert_eq!(result.ended_by, WalkEnd::ReturnedToStart);
    let order: Vec<usize> = result.steps.iter().map(|s| s.piece).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    assert!(result.steps.iter().all(|s| !s.reversed));
}

#[test]
fn test_start_piece_found_anywhere() {
    let catalog = catalog();
    let mut pieces = chain(&catalog, &STADIUM);
    pieces.rotate_left(3);
    let result = walk(&pieces, &catalog);

    assert!(result.closed);
    assert_eq!(result.start, Some(3));
    assert_eq!(result.steps[0].piece, 3);
    assert_eq!(result.len(), 6);
}

#[test]
fn test_reversed_piece_detected() {
    let catalog = catalog();
    let mut pieces = chain(&catalog, &STADIUM);
    // Flip the back straight so it is entered through its end
    let straight = &mut pieces[3];
    straight.position = trackkit_core::Position::new(80.0, 0.0, 0.0);
    straight.heading = 0.0;

    let result = walk(&pieces, &catalog);
    assert!(result.closed);
    let step = result.steps[3];
    assert_eq!(step.piece, 3);
    assert!(step.reversed);
    assert_eq!(step.entry(), EndpointKind::End);
    assert_eq!(step.exit(), EndpointKind::Start);
}

#[test]
fn test_dangling_track_is_open() {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM[..4]);
    let result = walk(&pieces, &catalog);

    assert!(!result.closed);
    assert_eq!(result.ended_by, WalkEnd::Dangling);
    assert_eq!(result.len(), 4);
}

#[test]
fn test_no_start_piece() {
    let catalog = catalog();
    let pieces = chain(&catalog, &["straight", "curve-left"]);
    let result = walk(&pieces, &catalog);

    assert!(!result.has_start());
    assert!(!result.closed);
    assert!(result.is_empty());
    assert_eq!(result.ended_by, WalkEnd::NoStart);
}

#[test]
fn test_two_piece_loop_never_closed() {
    let catalog = PieceCatalog::from_definitions([
        ("start", PieceDefinition::curve(20.0, PI * 0.999, 1).start()),
        ("arc", PieceDefinition::curve(20.0, PI * 0.999, 1)),
    ])
    .unwrap();
    let (pieces, _) = crate::fixtures::chain_from(&catalog, Default::default(), &["start", "arc"]);
    let result = walk(&pieces, &catalog);

    // The second arc returns to the start, but two pieces are not a loop
    assert_eq!(result.ended_by, WalkEnd::ReturnedToStart);
    assert_eq!(result.len(), 2);
    assert!(!result.closed);
}

#[test]
fn test_neighbors_wrap_on_closed_loop() {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM);
    let result = walk(&pieces, &catalog);

    assert_eq!(result.previous(0).map(|s| s.piece), Some(5));
    assert_eq!(result.next(5).map(|s| s.piece), Some(0));

    let open = walk(&pieces[..3], &catalog);
    assert!(open.previous(0).is_none());
    assert!(open.next(2).is_none());
}

#[test]
fn test_single_start_piece() {
    let catalog = catalog();
    let pieces = vec![piece(1, "start", 0.0, 0.0, 0.0)];
    let result = walk(&pieces, &catalog);

    assert!(result.has_start());
    assert_eq!(result.len(), 1);
    assert!(!result.closed);
}

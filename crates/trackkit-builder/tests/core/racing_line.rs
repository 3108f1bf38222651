use std::f64::consts::PI;
use trackkit_builder::connectivity::ConnectionGraph;
use trackkit_builder::racing_line::{traversal_points, CatmullRomCurve, RacingLine};
use trackkit_builder::traversal::{traverse, TraversalResult};
use trackkit_core::{PieceCatalog, PlacedPiece, Position};

use crate::fixtures::{catalog, chain, settings, STADIUM};

fn walk(pieces: &[PlacedPiece], catalog: &PieceCatalog) -> TraversalResult {
    let graph = ConnectionGraph::build(pieces, catalog, 8.0);
    traverse(&graph, pieces, catalog)
}

fn stadium_line() -> RacingLine {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM);
    let traversal = walk(&pieces, &catalog);
    RacingLine::build(&traversal, &pieces, &catalog, &settings().racing_line).unwrap()
}

#[test]
fn test_closed_curve_first_and_last_sample_coincide() {
    let line = stadium_line();
    assert!(line.is_closed());

    let samples = line.sample(100);
    let first = samples.first().unwrap();
    let last = samples.last().unwrap();
    assert!((first - last).norm() < 1e-9);
    assert!((line.point_at(0.0) - line.point_at(1.0)).norm() < 1e-9);
}

#[test]
fn test_seam_points_dropped() {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM);
    let traversal = walk(&pieces, &catalog);

    // 10 samples per piece, 5 shared seams and the closing seam removed
    let points = traversal_points(&traversal, &pieces, &catalog, 10);
    assert_eq!(points.len(), 6 * 10 - 5 - 1);
    for pair in points.windows(2) {
        assert!((pair[0] - pair[1]).norm() > 1e-6, "duplicate control point");
    }
}

#[test]
fn test_stadium_length_close_to_centerline() {
    let line = stadium_line();
    let centerline = 80.0 + 2.0 * PI * 40.0;
    assert!(
        (line.length() - centerline).abs() / centerline < 0.02,
        "length {} vs {}",
        line.length(),
        centerline
    );
}

#[test]
fn test_line_passes_through_start() {
    let line = stadium_line();
    assert!((line.point_at(0.0) - Position::origin()).norm() < 1e-9);

    let tangent = line.tangent_at(0.0);
    assert!((tangent.norm() - 1.0).abs() < 1e-9);
    assert!(tangent.z > 0.95);
}

#[test]
fn test_progress_along_lap() {
    let line = stadium_line();
    assert!(line.progress_of(&Position::origin()) < 0.01);

    let halfway = line.point_at_distance(line.length() / 2.0);
    assert!((line.progress_of(&halfway) - 0.5).abs() < 0.01);

    // Distances wrap on a closed line
    let wrapped = line.point_at_distance(line.length() + 10.0);
    let direct = line.point_at_distance(10.0);
    assert!((wrapped - direct).norm() < 1e-9);
}

#[test]
fn test_reversed_piece_samples_follow_travel() {
    let catalog = catalog();
    let mut pieces = chain(&catalog, &STADIUM);
    pieces[3].position = Position::new(80.0, 0.0, 0.0);
    pieces[3].heading = 0.0;
    let traversal = walk(&pieces, &catalog);
    assert!(traversal.closed);

    let points = traversal_points(&traversal, &pieces, &catalog, 10);
    let max_gap = points
        .windows(2)
        .map(|w| (w[0] - w[1]).norm())
        .fold(0.0, f64::max);
    assert!(max_gap < 8.0, "gap {} means a piece was sampled backwards", max_gap);
}

#[test]
fn test_open_traversal_gives_open_line() {
    let catalog = catalog();
    let pieces = chain(&catalog, &STADIUM[..3]);
    let traversal = walk(&pieces, &catalog);
    let line = RacingLine::build(&traversal, &pieces, &catalog, &settings().racing_line).unwrap();

    assert!(!line.is_closed());
    assert_eq!(line.curve().points().len(), 10 + 9 + 9);
    let end = line.point_at(1.0);
    assert!((end - Position::new(80.0, 0.0, 40.0)).norm() < 1e-9);
    assert!((line.progress_of(&end) - 1.0).abs() < 1e-9);
}

#[test]
fn test_empty_traversal_has_no_line() {
    let catalog = catalog();
    let line = RacingLine::build(
        &TraversalResult::empty(),
        &[],
        &catalog,
        &settings().racing_line,
    );
    assert!(line.is_none());
}

#[test]
fn test_curve_needs_two_points() {
    assert!(CatmullRomCurve::new(vec![Position::origin()], false, 0.5).is_none());

    let curve = CatmullRomCurve::new(
        vec![Position::origin(), Position::new(0.0, 0.0, 10.0)],
        false,
        0.5,
    )
    .unwrap();
    let mid = curve.point_at(0.5);
    assert!((mid - Position::new(0.0, 0.0, 5.0)).norm() < 1e-9);
}

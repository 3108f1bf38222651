use trackkit_builder::piece_store::PieceStore;
use trackkit_core::{PieceId, PlacementError, Pose, Position};

use crate::fixtures::catalog;

fn at(z: f64) -> Pose {
    Pose::new(Position::new(0.0, 0.0, z), 0.0)
}

#[test]
fn test_ids_are_monotonic_and_stable() {
    let catalog = catalog();
    let mut store = PieceStore::new();
    let a = store.insert(&catalog, "straight", at(0.0), None).unwrap();
    let b = store.insert(&catalog, "straight", at(40.0), None).unwrap();
    assert!(b > a);

    store.remove(a).unwrap();
    let c = store.insert(&catalog, "straight", at(80.0), None).unwrap();
    assert!(c > b);
    assert_eq!(store.index_of(b), Some(0));
    assert_eq!(store.index_of(c), Some(1));
}

#[test]
fn test_single_start_enforced() {
    let catalog = catalog();
    let mut store = PieceStore::new();
    let start = store.insert(&catalog, "start", at(0.0), None).unwrap();

    let err = store.insert(&catalog, "start", at(100.0), None).unwrap_err();
    assert_eq!(err, PlacementError::DuplicateStart { existing: start.0 });
    assert_eq!(store.len(), 1);
    assert_eq!(store.start_piece(&catalog), Some(start));

    // Replacing the start with itself is fine
    assert!(store.check_start(&catalog, "start", Some(start)).is_ok());
}

#[test]
fn test_unknown_type_rejected() {
    let catalog = catalog();
    let mut store = PieceStore::new();
    let err = store.insert(&catalog, "monorail", at(0.0), None).unwrap_err();
    assert!(matches!(err, PlacementError::UnknownType { .. }));
    assert!(store.is_empty());
}

#[test]
fn test_without_is_a_pure_filter() {
    let catalog = catalog();
    let mut store = PieceStore::new();
    let a = store.insert(&catalog, "straight", at(0.0), None).unwrap();
    let b = store.insert(&catalog, "straight", at(40.0), None).unwrap();

    let filtered = store.without(a);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, b);
    assert_eq!(store.len(), 2);
    assert!(store.get(a).is_some());
}

#[test]
fn test_restore_keeps_id_and_position() {
    let catalog = catalog();
    let mut store = PieceStore::new();
    let a = store.insert(&catalog, "straight", at(0.0), None).unwrap();
    let b = store.insert(&catalog, "straight", at(40.0), None).unwrap();
    store.insert(&catalog, "straight", at(80.0), None).unwrap();

    let (index, piece) = store.remove(b).unwrap();
    assert_eq!(index, 1);
    store.restore(index, piece);
    assert_eq!(store.index_of(b), Some(1));
    assert_eq!(store.index_of(a), Some(0));

    // Restored ids are never handed out again
    let d = store.insert(&catalog, "straight", at(120.0), None).unwrap();
    assert_eq!(d, PieceId(4));
}

#[test]
fn test_update_pose() {
    let catalog = catalog();
    let mut store = PieceStore::new();
    let a = store.insert(&catalog, "straight", at(0.0), None).unwrap();
    store.update_pose(a, at(15.0)).unwrap();
    assert_eq!(store.get(a).unwrap().position.z, 15.0);

    let err = store.update_pose(PieceId(99), at(0.0)).unwrap_err();
    assert_eq!(err, PlacementError::UnknownPiece { id: 99 });
}

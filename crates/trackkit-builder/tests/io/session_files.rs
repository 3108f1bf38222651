use tempfile::TempDir;
use trackkit_builder::session::TrackSession;
use trackkit_core::PersistenceError;

use crate::fixtures::{catalog, chain, STADIUM};

fn stadium_session() -> TrackSession {
    let mut session = TrackSession::default();
    for piece in chain(&catalog(), &STADIUM) {
        session.place_piece(&piece.piece_type, piece.pose()).unwrap();
    }
    session.name = "Stadium".to_string();
    session
}

#[test]
fn test_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stadium.json");

    let mut session = stadium_session();
    session.save_to_file(&path).unwrap();
    assert!(!session.is_modified);
    assert_eq!(session.current_file_path.as_deref(), Some(path.as_path()));

    let mut loaded = TrackSession::default();
    loaded.load_from_file(&path).unwrap();
    assert_eq!(loaded.name, "Stadium");
    assert_eq!(loaded.pieces().len(), 6);
    assert!(loaded.status().closed);
    assert!(!loaded.can_undo());

    for (a, b) in session.pieces().iter().zip(loaded.pieces()) {
        assert_eq!(a.piece_type, b.piece_type);
        assert_eq!(a.position, b.position);
        assert_eq!(a.heading, b.heading);
    }
}

#[test]
fn test_metadata_identity_survives_resave() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stadium.json");

    let mut session = stadium_session();
    session.save_to_file(&path).unwrap();
    let first = session.to_track_file().metadata.unwrap();

    session.save_to_file(&path).unwrap();
    let second = session.to_track_file().metadata.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.created, second.created);
    assert!(second.modified >= first.modified);
}

#[test]
fn test_failed_load_keeps_current_track() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("future.json");
    std::fs::write(
        &path,
        r#"{ "version": 9, "pieces": [
            { "type": "start", "position": { "x": 0, "y": 0, "z": 0 }, "heading": 0 }
        ] }"#,
    )
    .unwrap();

    let mut session = stadium_session();
    let err = session.load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::UnsupportedVersion { found: 9, .. }
    ));
    assert_eq!(session.pieces().len(), 6);
    assert!(session.status().closed);
    assert!(session.current_file_path.is_none());
}

#[test]
fn test_load_with_unknown_type_keeps_current_track() {
    let mut session = stadium_session();
    let mut file = session.to_track_file();
    file.pieces[2].piece_type = "teleporter".to_string();

    assert!(matches!(
        session.load_track_file(&file),
        Err(PersistenceError::UnknownPieceType { index: 2, .. })
    ));
    assert_eq!(session.pieces().len(), 6);
    assert!(session.can_undo());
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = TrackSession::default();
    let err = session
        .load_from_file(temp_dir.path().join("nope.json"))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}

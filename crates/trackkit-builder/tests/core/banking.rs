use std::collections::HashMap;
use trackkit_builder::banking::{
    ramp_fraction, smooth_banked_transitions, BankProfile, BankedTransitionSmoother, GeometrySink,
};
use trackkit_builder::connectivity::ConnectionGraph;
use trackkit_builder::traversal::{traverse, TraversalResult};
use trackkit_core::{PieceCatalog, PieceId, PlacedPiece, Position};
use trackkit_settings::BankingSettings;

use crate::fixtures::{approx, catalog, chain, BANKED_STADIUM};

fn walk(pieces: &[PlacedPiece], catalog: &PieceCatalog) -> TraversalResult {
    let graph = ConnectionGraph::build(pieces, catalog, 8.0);
    traverse(&graph, pieces, catalog)
}

#[derive(Default)]
struct RecordingSink {
    calls: HashMap<PieceId, (bool, bool)>,
}

impl GeometrySink for RecordingSink {
    fn regenerate(&mut self, piece: PieceId, profile: &BankProfile) {
        self.calls.insert(piece, profile.flags());
    }
}

#[test]
fn test_consecutive_banked_curves_stay_continuous() {
    let catalog = catalog();
    let pieces = chain(&catalog, &BANKED_STADIUM);
    let traversal = walk(&pieces, &catalog);
    let profiles =
        smooth_banked_transitions(&traversal, &pieces, &catalog, &BankingSettings::default());

    assert_eq!(profiles.len(), 2);
    let first = &profiles[0];
    let second = &profiles[1];
    assert_eq!(first.piece_index, 1);
    assert_eq!(first.flags(), (true, false));
    assert_eq!(second.piece_index, 2);
    assert_eq!(second.flags(), (false, true));
}

#[test]
fn test_isolated_banked_curve_ramps_both_ends() {
    let catalog = catalog();
    let pieces = chain(
        &catalog,
        &["start", "banked-left", "curve-left", "straight", "curve-left", "curve-left"],
    );
    let traversal = walk(&pieces, &catalog);
    let profiles =
        smooth_banked_transitions(&traversal, &pieces, &catalog, &BankingSettings::default());

    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].flags(), (true, true));
    assert!(approx(profiles[0].bank_angle, 0.35));
}

#[test]
fn test_reversed_travel_swaps_ends() {
    let catalog = catalog();
    let mut pieces = chain(&catalog, &BANKED_STADIUM);
    // Re-lay the second banked turn end-first: a right-hand banked curve
    // traced from the far end covers the same arc
    pieces[2].piece_type = "banked-right".to_string();
    pieces[2].position = Position::new(80.0, 0.0, 40.0);
    pieces[2].heading = 0.0;

    let traversal = walk(&pieces, &catalog);
    assert!(traversal.closed);
    assert!(traversal.steps[2].reversed);

    let profiles =
        smooth_banked_transitions(&traversal, &pieces, &catalog, &BankingSettings::default());
    let reversed = profiles.iter().find(|p| p.piece_index == 2).unwrap();
    // Traveled end to start: the straight follows its geometric start
    assert_eq!(reversed.flags(), (true, false));
}

#[test]
fn test_open_track_has_no_wraparound() {
    let catalog = catalog();
    let pieces = chain(&catalog, &["banked-left", "start"]);
    // The start piece begins where the banked curve ends, so the walk finds
    // nothing before the start
    let traversal = walk(&pieces, &catalog);
    let profiles =
        smooth_banked_transitions(&traversal, &pieces, &catalog, &BankingSettings::default());
    assert!(profiles.is_empty());
}

#[test]
fn test_bank_profile_ramps() {
    let profile = BankProfile {
        piece_id: PieceId(1),
        piece_index: 0,
        bank_angle: 0.4,
        entry_transition: true,
        exit_transition: false,
        ramp_fraction: 0.25,
    };

    assert!(approx(profile.bank_at(0.0), 0.0));
    assert!(approx(profile.bank_at(0.125), 0.2));
    assert!(approx(profile.bank_at(0.25), 0.4));
    assert!(approx(profile.bank_at(1.0), 0.4));

    let both = BankProfile {
        exit_transition: true,
        ..profile
    };
    assert!(approx(both.bank_at(1.0), 0.0));
    assert!(approx(both.bank_at(0.5), 0.4));
}

#[test]
fn test_tighter_curves_get_wider_ramps() {
    let catalog = catalog();
    let settings = BankingSettings::default();
    let wide = ramp_fraction(catalog.get("banked-left").unwrap(), &settings);
    let tight = ramp_fraction(catalog.get("banked-left-tight").unwrap(), &settings);

    assert!(tight > wide);
    assert!(wide >= settings.min_ramp_fraction);
    assert!(tight <= settings.max_ramp_fraction);
}

#[test]
fn test_smoother_regenerates_only_changes() {
    let catalog = catalog();
    let pieces = chain(&catalog, &BANKED_STADIUM);
    let traversal = walk(&pieces, &catalog);
    let profiles =
        smooth_banked_transitions(&traversal, &pieces, &catalog, &BankingSettings::default());

    let mut smoother = BankedTransitionSmoother::new();
    let mut sink = RecordingSink::default();
    assert_eq!(smoother.apply(&profiles, Some(&mut sink)), 2);
    assert_eq!(sink.calls.len(), 2);
    assert_eq!(smoother.flags(PieceId(2)), Some((true, false)));

    // Same flags again: nothing to regenerate
    let mut sink = RecordingSink::default();
    assert_eq!(smoother.apply(&profiles, Some(&mut sink)), 0);
    assert!(sink.calls.is_empty());

    // Flip one piece's flags
    let mut changed = profiles.clone();
    changed[1].entry_transition = true;
    let mut sink = RecordingSink::default();
    assert_eq!(smoother.apply(&changed, Some(&mut sink)), 1);
    assert_eq!(sink.calls.get(&PieceId(3)), Some(&(true, true)));
    assert!(!sink.calls.contains_key(&PieceId(2)));
}

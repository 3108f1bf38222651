//! Banked-curve transition smoothing.
//!
//! A banked curve ramps its bank angle in from zero at any end that borders a
//! non-banked neighbor in travel order. Ends bordering another banked piece
//! keep full bank so consecutive banked curves stay continuous.

use std::collections::HashMap;
use trackkit_core::math::smootherstep;
use trackkit_core::{PieceCatalog, PieceDefinition, PieceId, PlacedPiece};
use trackkit_settings::BankingSettings;

use crate::traversal::{TraversalResult, TraversalStep};

/// Bank profile along one piece, in geometric (start to end) order.
///
/// `entry_transition` ramps at the piece's start, `exit_transition` at its end,
/// whichever way the piece is traveled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankProfile {
    pub piece_id: PieceId,
    pub piece_index: usize,
    pub bank_angle: f64,
    pub entry_transition: bool,
    pub exit_transition: bool,
    /// Ramp width as a fraction of arc length
    pub ramp_fraction: f64,
}

impl BankProfile {
    /// Bank angle at arc fraction `t` in `[0, 1]`.
    pub fn bank_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let ramp = self.ramp_fraction;
        let mut factor = 1.0;
        if self.entry_transition && t < ramp {
            factor *= smootherstep(t / ramp);
        }
        if self.exit_transition && t > 1.0 - ramp {
            factor *= smootherstep((1.0 - t) / ramp);
        }
        self.bank_angle * factor
    }

    pub fn flags(&self) -> (bool, bool) {
        (self.entry_transition, self.exit_transition)
    }
}

/// Ramp fraction for a piece: a fixed ramp length over the arc, clamped.
///
/// Shorter, sharper arcs get a wider fraction.
pub fn ramp_fraction(def: &PieceDefinition, settings: &BankingSettings) -> f64 {
    let arc = def.arc_length();
    if arc <= 0.0 {
        return settings.max_ramp_fraction;
    }
    (settings.ramp_length / arc).clamp(settings.min_ramp_fraction, settings.max_ramp_fraction)
}

fn is_banked(step: Option<&TraversalStep>, pieces: &[PlacedPiece], catalog: &PieceCatalog) -> bool {
    step.and_then(|s| pieces.get(s.piece))
        .and_then(|p| catalog.get(&p.piece_type))
        .is_some_and(PieceDefinition::is_banked)
}

/// Profiles for every banked piece on the traversal.
pub fn smooth_banked_transitions(
    traversal: &TraversalResult,
    pieces: &[PlacedPiece],
    catalog: &PieceCatalog,
    settings: &BankingSettings,
) -> Vec<BankProfile> {
    let mut profiles = Vec::new();
    for (i, step) in traversal.steps.iter().enumerate() {
        let Some(piece) = pieces.get(step.piece) else {
            continue;
        };
        let Some(def) = catalog.get(&piece.piece_type).filter(|d| d.is_banked()) else {
            continue;
        };

        let ramp_in = !is_banked(traversal.previous(i), pieces, catalog);
        let ramp_out = !is_banked(traversal.next(i), pieces, catalog);
        let (entry_transition, exit_transition) = if step.reversed {
            (ramp_out, ramp_in)
        } else {
            (ramp_in, ramp_out)
        };

        profiles.push(BankProfile {
            piece_id: piece.id,
            piece_index: step.piece,
            bank_angle: def.bank_angle,
            entry_transition,
            exit_transition,
            ramp_fraction: ramp_fraction(def, settings),
        });
    }
    profiles
}

/// Receives regenerated piece geometry (mesh building lives with the renderer).
pub trait GeometrySink {
    fn regenerate(&mut self, piece: PieceId, profile: &BankProfile);
}

/// Tracks the last applied transition flags per piece.
#[derive(Debug, Clone, Default)]
pub struct BankedTransitionSmoother {
    applied: HashMap<PieceId, (bool, bool)>,
}

impl BankedTransitionSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied flags for a piece.
    pub fn flags(&self, piece: PieceId) -> Option<(bool, bool)> {
        self.applied.get(&piece).copied()
    }

    /// Records `profiles` and regenerates only pieces whose flags changed.
    ///
    /// Returns the number of pieces regenerated.
    pub fn apply(
        &mut self,
        profiles: &[BankProfile],
        mut sink: Option<&mut (dyn GeometrySink + '_)>,
    ) -> usize {
        let mut regenerated = 0;
        let mut seen = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            let flags = profile.flags();
            seen.insert(profile.piece_id, flags);
            if self.applied.get(&profile.piece_id) == Some(&flags) {
                continue;
            }
            if let Some(sink) = sink.as_deref_mut() {
                sink.regenerate(profile.piece_id, profile);
            }
            regenerated += 1;
        }
        self.applied = seen;
        if regenerated > 0 {
            tracing::debug!("Regenerated {} banked pieces", regenerated);
        }
        regenerated
    }

    pub fn clear(&mut self) {
        self.applied.clear();
    }
}

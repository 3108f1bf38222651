//! Piece catalog: read-only shape parameters keyed by piece type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::error::CatalogError;

/// Shape parameters for one piece type.
///
/// A definition with `curve_angle == 0` is a straight of `length`; otherwise it
/// is an arc of `curve_radius` sweeping `curve_angle` toward local `+X * direction`
/// (`+1` turns left when facing +Z).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceDefinition {
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub curve_radius: f64,
    #[serde(default)]
    pub curve_angle: f64,
    #[serde(default = "default_direction")]
    pub direction: i8,
    #[serde(default)]
    pub bank_angle: f64,
    #[serde(default)]
    pub is_start: bool,
}

fn default_direction() -> i8 {
    1
}

impl PieceDefinition {
    pub fn straight(length: f64) -> Self {
        Self {
            length,
            curve_radius: 0.0,
            curve_angle: 0.0,
            direction: 1,
            bank_angle: 0.0,
            is_start: false,
        }
    }

    pub fn curve(radius: f64, angle: f64, direction: i8) -> Self {
        Self {
            length: 0.0,
            curve_radius: radius,
            curve_angle: angle,
            direction,
            bank_angle: 0.0,
            is_start: false,
        }
    }

    pub fn banked(mut self, bank_angle: f64) -> Self {
        self.bank_angle = bank_angle;
        self
    }

    pub fn start(mut self) -> Self {
        self.is_start = true;
        self
    }

    pub fn is_curve(&self) -> bool {
        self.curve_angle != 0.0
    }

    /// Banking only applies to curved pieces.
    pub fn is_banked(&self) -> bool {
        self.is_curve() && self.bank_angle != 0.0
    }

    /// Turn sense as a float, `+1.0` or `-1.0`.
    pub fn direction_sign(&self) -> f64 {
        if self.direction < 0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Centerline length of the piece.
    pub fn arc_length(&self) -> f64 {
        if self.is_curve() {
            self.curve_radius * self.curve_angle.abs()
        } else {
            self.length
        }
    }

    fn validate(&self, piece_type: &str) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidDefinition {
            piece_type: piece_type.to_string(),
            reason: reason.to_string(),
        };

        if self.direction != 1 && self.direction != -1 {
            return Err(invalid("direction must be +1 or -1"));
        }
        if self.is_curve() {
            if !(self.curve_radius > 0.0) {
                return Err(invalid("curve radius must be positive"));
            }
            if !(self.curve_angle > 0.0 && self.curve_angle < TAU) {
                return Err(invalid("curve angle must be in (0, 2pi)"));
            }
        } else if !(self.length > 0.0) {
            return Err(invalid("straight length must be positive"));
        }
        if !self.bank_angle.is_finite() {
            return Err(invalid("bank angle must be finite"));
        }
        Ok(())
    }
}

/// Read-only lookup from piece type to definition.
///
/// At most one type may be flagged as the start piece.
#[derive(Debug, Clone, Default)]
pub struct PieceCatalog {
    definitions: BTreeMap<String, PieceDefinition>,
    start_type: Option<String>,
}

impl PieceCatalog {
    /// Builds a catalog, rejecting invalid or conflicting definitions.
    pub fn from_definitions<I, S>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, PieceDefinition)>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for (piece_type, def) in definitions {
            let piece_type = piece_type.into();
            def.validate(&piece_type)?;

            if catalog.definitions.contains_key(&piece_type) {
                return Err(CatalogError::DuplicateType { piece_type });
            }
            if def.is_start {
                if let Some(first) = &catalog.start_type {
                    return Err(CatalogError::DuplicateStartType {
                        first: first.clone(),
                        second: piece_type,
                    });
                }
                catalog.start_type = Some(piece_type.clone());
            }
            catalog.definitions.insert(piece_type, def);
        }
        tracing::debug!(
            "Built piece catalog: {} types, start type {:?}",
            catalog.len(),
            catalog.start_type
        );
        Ok(catalog)
    }

    /// Parses a JSON object of `type -> definition`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, PieceDefinition> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                reason: e.to_string(),
            })?;
        Self::from_definitions(raw)
    }

    /// The stock piece set.
    pub fn standard() -> Self {
        let defs = [
            ("start", PieceDefinition::straight(40.0).start()),
            ("straight", PieceDefinition::straight(40.0)),
            ("straight-short", PieceDefinition::straight(20.0)),
            ("curve-left", PieceDefinition::curve(40.0, FRAC_PI_2, 1)),
            ("curve-right", PieceDefinition::curve(40.0, FRAC_PI_2, -1)),
            ("curve-left-45", PieceDefinition::curve(40.0, FRAC_PI_4, 1)),
            ("curve-right-45", PieceDefinition::curve(40.0, FRAC_PI_4, -1)),
            (
                "banked-left",
                PieceDefinition::curve(40.0, FRAC_PI_2, 1).banked(0.35),
            ),
            (
                "banked-right",
                PieceDefinition::curve(40.0, FRAC_PI_2, -1).banked(0.35),
            ),
            (
                "banked-left-tight",
                PieceDefinition::curve(24.0, FRAC_PI_2, 1).banked(0.45),
            ),
            (
                "banked-right-tight",
                PieceDefinition::curve(24.0, FRAC_PI_2, -1).banked(0.45),
            ),
        ];

        let mut catalog = Self::default();
        for (name, def) in defs {
            if def.is_start {
                catalog.start_type = Some(name.to_string());
            }
            catalog.definitions.insert(name.to_string(), def);
        }
        catalog
    }

    pub fn get(&self, piece_type: &str) -> Option<&PieceDefinition> {
        self.definitions.get(piece_type)
    }

    pub fn contains(&self, piece_type: &str) -> bool {
        self.definitions.contains_key(piece_type)
    }

    /// True if this type is the start piece.
    pub fn is_start(&self, piece_type: &str) -> bool {
        self.get(piece_type).is_some_and(|d| d.is_start)
    }

    pub fn start_type(&self) -> Option<&str> {
        self.start_type.as_deref()
    }

    /// Type identifiers in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

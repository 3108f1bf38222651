//! Serialization and deserialization for saved tracks.
//!
//! A track file is a JSON document holding the ordered placed-piece list:
//! `{ "version": 1, "pieces": [{ "type", "position": {x, y, z}, "heading" }] }`.
//! Files written by any other format version are rejected outright.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trackkit_core::{PersistenceError, PieceCatalog, PieceId, PlacedPiece, Position};
use uuid::Uuid;

/// Track file format version
pub const FORMAT_VERSION: u32 = 1;

/// Complete track file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFile {
    pub version: u32,
    pub pieces: Vec<PieceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TrackMetadata>,
}

/// One placed piece as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceRecord {
    #[serde(rename = "type")]
    pub piece_type: String,
    pub position: PositionRecord,
    pub heading: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Position> for PositionRecord {
    fn from(p: Position) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<PositionRecord> for Position {
    fn from(p: PositionRecord) -> Self {
        Position::new(p.x, p.y, p.z)
    }
}

/// Track metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl TrackMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created: now,
            modified: now,
        }
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl TrackFile {
    /// Create a new, empty track file
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: FORMAT_VERSION,
            pieces: Vec::new(),
            metadata: Some(TrackMetadata::new(name)),
        }
    }

    /// Build a file from placed pieces, keeping their order
    pub fn from_pieces<'a>(
        name: impl Into<String>,
        pieces: impl IntoIterator<Item = &'a PlacedPiece>,
    ) -> Self {
        let mut file = Self::new(name);
        file.pieces = pieces.into_iter().map(PieceRecord::from).collect();
        file
    }

    /// Parse a track file, checking the version before anything else
    pub fn from_json_str(json: &str) -> Result<Self, PersistenceError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: probe.version,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save track to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let json = self.to_json_string()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Load track from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate against `catalog` and convert to placed pieces with fresh ids.
    ///
    /// Fails on unknown piece types or more than one start piece; nothing
    /// is returned unless every record is usable.
    pub fn to_pieces(&self, catalog: &PieceCatalog) -> Result<Vec<PlacedPiece>, PersistenceError> {
        let mut start: Option<usize> = None;
        let mut pieces = Vec::with_capacity(self.pieces.len());

        for (index, record) in self.pieces.iter().enumerate() {
            if !catalog.contains(&record.piece_type) {
                return Err(PersistenceError::UnknownPieceType {
                    index,
                    piece_type: record.piece_type.clone(),
                });
            }
            if catalog.is_start(&record.piece_type) {
                if let Some(first) = start {
                    return Err(PersistenceError::DuplicateStart {
                        first,
                        second: index,
                    });
                }
                start = Some(index);
            }

            let id = PieceId(index as u64 + 1);
            let mut piece = PlacedPiece::new(
                id,
                record.piece_type.clone(),
                record.position.into(),
                record.heading,
            );
            piece.elevation = record.elevation;
            pieces.push(piece);
        }
        Ok(pieces)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.name.as_str())
    }
}

impl From<&PlacedPiece> for PieceRecord {
    fn from(piece: &PlacedPiece) -> Self {
        Self {
            piece_type: piece.piece_type.clone(),
            position: piece.position.into(),
            heading: piece.heading,
            elevation: piece.elevation,
        }
    }
}

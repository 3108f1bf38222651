//! Track builder configuration.
//!
//! Distances are in world units, angles in degrees in the file and radians
//! through the accessor methods.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Proximity thresholds used by linking, validation and snapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Max endpoint distance for two pieces to be linked in the graph
    pub link_tolerance: f64,
    /// Endpoint distance under which a placement counts as an intended connection
    pub connection_threshold: f64,
    /// Midpoint distance under which two unconnected pieces overlap
    pub overlap_threshold: f64,
    /// Cursor-to-endpoint radius for snap candidates
    pub snap_distance: f64,
    /// Cursor distances closer than this are treated as a tie
    pub distance_tie_margin: f64,
    /// Requested rotation within this angle of a fold-back candidate selects it
    pub reversal_capture_angle_deg: f64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            link_tolerance: 8.0,
            connection_threshold: 5.0,
            overlap_threshold: 18.0,
            snap_distance: 25.0,
            distance_tie_margin: 1.0,
            reversal_capture_angle_deg: 45.0,
        }
    }
}

impl ConnectionSettings {
    pub fn reversal_capture_angle(&self) -> f64 {
        self.reversal_capture_angle_deg.to_radians()
    }
}

/// Racing line sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacingLineSettings {
    /// Samples per piece, endpoints included
    pub samples_per_piece: usize,
    /// Catmull-Rom parametrization exponent (0.5 = centripetal)
    pub catmull_rom_alpha: f64,
    /// Subdivisions used for arc length and progress lookups
    pub arc_length_divisions: usize,
}

impl Default for RacingLineSettings {
    fn default() -> Self {
        Self {
            samples_per_piece: 10,
            catmull_rom_alpha: 0.5,
            arc_length_divisions: 200,
        }
    }
}

/// Bank transition ramps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankingSettings {
    /// Target ramp length along the arc
    pub ramp_length: f64,
    /// Lower clamp on the ramp as a fraction of arc length
    pub min_ramp_fraction: f64,
    /// Upper clamp on the ramp as a fraction of arc length
    pub max_ramp_fraction: f64,
}

impl Default for BankingSettings {
    fn default() -> Self {
        Self {
            ramp_length: 20.0,
            min_ramp_fraction: 0.15,
            max_ramp_fraction: 0.45,
        }
    }
}

/// Interactive editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Rotation applied per rotate input
    pub rotation_step_deg: f64,
    /// World height of one elevation level
    pub level_height: f64,
    /// Max commands kept for undo
    pub history_depth: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            rotation_step_deg: 45.0,
            level_height: 6.0,
            history_depth: 100,
        }
    }
}

impl EditorSettings {
    pub fn rotation_step(&self) -> f64 {
        self.rotation_step_deg.to_radians()
    }
}

/// Complete track builder configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrackSettings {
    pub connection: ConnectionSettings,
    pub racing_line: RacingLineSettings,
    pub banking: BankingSettings,
    pub editor: EditorSettings,
}

impl TrackSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config_dir>/trackkit/settings.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("trackkit").join("settings.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match extension(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        tracing::debug!("Loaded track settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(
                "No settings file at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let c = &self.connection;
        for (key, value) in [
            ("connection.link_tolerance", c.link_tolerance),
            ("connection.connection_threshold", c.connection_threshold),
            ("connection.overlap_threshold", c.overlap_threshold),
            ("connection.snap_distance", c.snap_distance),
        ] {
            if !(value > 0.0) {
                return Err(SettingsError::invalid(key, "must be > 0"));
            }
        }
        if c.distance_tie_margin < 0.0 {
            return Err(SettingsError::invalid(
                "connection.distance_tie_margin",
                "must be >= 0",
            ));
        }
        if c.link_tolerance < c.connection_threshold {
            return Err(SettingsError::invalid(
                "connection.link_tolerance",
                "must not be smaller than connection_threshold",
            ));
        }
        if !(0.0..=180.0).contains(&c.reversal_capture_angle_deg) {
            return Err(SettingsError::invalid(
                "connection.reversal_capture_angle_deg",
                "must be within [0, 180]",
            ));
        }

        let r = &self.racing_line;
        if r.samples_per_piece < 2 {
            return Err(SettingsError::invalid(
                "racing_line.samples_per_piece",
                "must be >= 2",
            ));
        }
        if !(0.0..=1.0).contains(&r.catmull_rom_alpha) {
            return Err(SettingsError::invalid(
                "racing_line.catmull_rom_alpha",
                "must be within [0, 1]",
            ));
        }
        if r.arc_length_divisions == 0 {
            return Err(SettingsError::invalid(
                "racing_line.arc_length_divisions",
                "must be > 0",
            ));
        }

        let b = &self.banking;
        if !(b.ramp_length > 0.0) {
            return Err(SettingsError::invalid("banking.ramp_length", "must be > 0"));
        }
        if !(b.min_ramp_fraction > 0.0 && b.min_ramp_fraction <= b.max_ramp_fraction)
            || b.max_ramp_fraction > 0.5
        {
            return Err(SettingsError::invalid(
                "banking.min_ramp_fraction",
                "ramp fractions must satisfy 0 < min <= max <= 0.5",
            ));
        }

        let e = &self.editor;
        if !(e.rotation_step_deg > 0.0) {
            return Err(SettingsError::invalid(
                "editor.rotation_step_deg",
                "must be > 0",
            ));
        }
        if !(e.level_height > 0.0) {
            return Err(SettingsError::invalid("editor.level_height", "must be > 0"));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

fn extension(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

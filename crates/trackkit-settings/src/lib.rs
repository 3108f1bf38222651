//! TrackKit Settings Crate
//!
//! Handles track builder configuration: linking and snapping tolerances,
//! racing line sampling, banking ramps and editor preferences.
//! Supports JSON and TOML files stored in the platform config directory.

pub mod config;
pub mod error;

pub use config::{
    BankingSettings, ConnectionSettings, EditorSettings, RacingLineSettings, TrackSettings,
};
pub use error::{SettingsError, SettingsResult};

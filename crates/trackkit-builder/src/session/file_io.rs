//! File I/O operations (save, load) for the track session.

use chrono::Utc;
use std::path::Path;
use trackkit_core::PersistenceError;

use super::TrackSession;
use crate::serialization::{TrackFile, TrackMetadata};

impl TrackSession {
    /// Snapshot of the current track in file form.
    pub fn to_track_file(&self) -> TrackFile {
        let mut file = TrackFile::from_pieces(&self.name, self.store.iter());
        if let Some(existing) = &self.metadata {
            file.metadata = Some(TrackMetadata {
                name: self.name.clone(),
                modified: Utc::now(),
                ..existing.clone()
            });
        }
        file
    }

    /// Replaces the current track with `file`.
    ///
    /// The file is fully validated first; on error the current track is left
    /// exactly as it was.
    pub fn load_track_file(&mut self, file: &TrackFile) -> Result<(), PersistenceError> {
        let pieces = file.to_pieces(&self.catalog)?;
        let count = pieces.len();

        self.drag = None;
        self.store.replace_all(pieces);
        self.clear_history();
        self.smoother.clear();
        self.metadata = file.metadata.clone();
        if let Some(name) = file.name() {
            self.name = name.to_string();
        }
        self.is_modified = false;
        self.line_stale = true;
        let status = self.rebuild();

        tracing::info!(
            "Loaded track '{}': {} pieces (closed: {})",
            self.name,
            count,
            status.closed
        );
        Ok(())
    }

    /// Save track to file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let file = self.to_track_file();
        file.save_to_file(&path)?;

        self.metadata = file.metadata;
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;
        tracing::info!(
            "Saved {} pieces to {}",
            file.pieces.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Load track from file.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let file = TrackFile::load_from_file(&path).inspect_err(|e| {
            tracing::warn!("Failed to load {}: {}", path.as_ref().display(), e);
        })?;
        self.load_track_file(&file)?;
        self.current_file_path = Some(path.as_ref().to_path_buf());
        Ok(())
    }
}

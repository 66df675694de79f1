//! Snapshot file I/O and board startup.
//!
//! DESIGN
//! ======
//! The board is saved as one JSON document that is rewritten in full by every
//! checkpoint. Writes go to a sibling `.tmp` file that is then renamed over
//! the target, so a crash mid-write leaves the previous snapshot intact.
//!
//! Loading never fails the process: a missing file starts a fresh board, and
//! an unreadable or malformed one starts from whatever the decoder recovered.
//! A snapshot that decoded with issues is copied to `{path}.corrupt` first,
//! since the next checkpoint overwrites it with the recovered board.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use board::camera::Viewport;
use board::codec::{self, Decoded, Snapshot};
use board::engine::Engine;
use board::presets::paint_preset_terrain;
use tracing::{error, info, warn};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot io failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for checkpoint writes.
pub trait SnapshotSink {
    /// Replace the stored snapshot with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the snapshot could not be stored.
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// A snapshot stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where a snapshot that failed to decode cleanly is preserved.
    #[must_use]
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(suffix);
        path.into()
    }

    /// Copy the current snapshot to [`Self::corrupt_path`], replacing any
    /// earlier copy.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] when the copy fails.
    pub fn preserve_corrupt(&self) -> Result<PathBuf, PersistError> {
        let target = self.corrupt_path();
        fs::copy(&self.path, &target).map_err(|e| self.io_error(e))?;
        Ok(target)
    }

    /// Read and decode the snapshot. `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] for any read failure other than a missing file.
    pub fn load(&self, fallback: Viewport) -> Result<Option<Decoded>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(codec::decode(&text, fallback))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Write to `{path}.tmp`, flush it to disk, then rename over `path`.
    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)
    }

    fn io_error(&self, source: io::Error) -> PersistError {
        PersistError::Io { path: self.path.clone(), source }
    }
}

impl SnapshotSink for SnapshotFile {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let text = serde_json::to_string(snapshot)?;
        self.write_atomic(text.as_bytes()).map_err(|e| self.io_error(e))
    }
}

/// Build the engine for this run from the snapshot file, or a fresh board.
pub fn open_engine(file: &SnapshotFile, config: &Config) -> Engine {
    let fallback = Viewport::centered_on(config.start_cell, config.start_anchor());
    match file.load(fallback) {
        Ok(Some(decoded)) => {
            let mut engine = Engine::with_viewport(fallback);
            let issues = engine.restore(decoded);
            if issues.is_empty() {
                info!(path = %file.path().display(), entities = engine.store.len(), "snapshot loaded");
            } else {
                warn!(
                    path = %file.path().display(),
                    entities = engine.store.len(),
                    issues = issues.len(),
                    "snapshot loaded with degraded sections"
                );
                match file.preserve_corrupt() {
                    Ok(backup) => warn!(backup = %backup.display(), "original snapshot preserved"),
                    Err(err) => error!(%err, "could not preserve original snapshot"),
                }
            }
            engine
        }
        Ok(None) => {
            info!(path = %file.path().display(), "no snapshot found; starting a fresh board");
            fresh_engine(fallback, config)
        }
        Err(err) => {
            error!(%err, "snapshot unreadable; starting a fresh board");
            fresh_engine(fallback, config)
        }
    }
}

fn fresh_engine(viewport: Viewport, config: &Config) -> Engine {
    let mut engine = Engine::with_viewport(viewport);
    if config.preset_terrain {
        paint_preset_terrain(&mut engine.store);
    }
    engine
}

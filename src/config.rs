//! Host configuration from environment variables.
//!
//! Every value has a typed default; a variable that is unset or fails to
//! parse falls back to it.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use board::camera::{GridCoord, Point};
use board::consts::{DEFAULT_START_CELL, START_ANCHOR_PX};

const DEFAULT_SNAPSHOT_PATH: &str = "autosave.json";
const DEFAULT_CHECKPOINT_MS: u64 = 5_000;
const MIN_CHECKPOINT_MS: u64 = 100;
const DEFAULT_PRESET_TERRAIN: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Snapshot file read on start and overwritten by every checkpoint.
    pub snapshot_path: PathBuf,
    /// Delay between the end of one checkpoint and the start of the next.
    /// Never below [`MIN_CHECKPOINT_MS`].
    pub checkpoint_ms: u64,
    /// Paint the preset terrain regions when starting without a snapshot.
    pub preset_terrain: bool,
    /// Cell placed at the start anchor when no saved viewport exists.
    pub start_cell: GridCoord,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            snapshot_path: env_string("PLANBOARD_SNAPSHOT_PATH", DEFAULT_SNAPSHOT_PATH).into(),
            checkpoint_ms: checkpoint_ms("PLANBOARD_CHECKPOINT_MS"),
            preset_terrain: env_parse("PLANBOARD_PRESET_TERRAIN", DEFAULT_PRESET_TERRAIN),
            start_cell: GridCoord::new(
                env_parse("PLANBOARD_START_X", DEFAULT_START_CELL.0),
                env_parse("PLANBOARD_START_Y", DEFAULT_START_CELL.1),
            ),
        }
    }

    #[must_use]
    pub fn checkpoint_delay(&self) -> Duration {
        Duration::from_millis(self.checkpoint_ms)
    }

    /// Screen position of the start cell.
    #[must_use]
    pub fn start_anchor(&self) -> Point {
        Point::new(START_ANCHOR_PX, START_ANCHOR_PX)
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Checkpoint delay from `key`, raised to the minimum so a zero cannot spin
/// the checkpoint loop.
fn checkpoint_ms(key: &str) -> u64 {
    env_parse(key, DEFAULT_CHECKPOINT_MS).max(MIN_CHECKPOINT_MS)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

//! Snapshot encoding of the store and viewport.
//!
//! The on-disk shape is a single JSON object:
//!
//! ```text
//! {
//!   "placed_objects": { "x,y": { "tag", "color", "size": [w, h], "avatar" } },
//!   "terrain_cells":  { "x,y": "mud" | "dark_mud" },
//!   "markers":        { name: { "x1", "y1", "x2", "y2", "color" } },
//!   "pan_x": f64, "pan_y": f64, "zoom_factor": f64
//! }
//! ```
//!
//! Decoding never fails. Each collection is recovered independently: a
//! missing one is empty, a malformed one is empty and reported as a
//! [`SnapshotError`]. Missing viewport scalars keep the caller's fallback.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::camera::{GridCoord, Viewport};
use crate::consts::DEFAULT_OBJECT_SIZE;
use crate::doc::{Bbox, EntityStore, PlacedObject, Size, TerrainType};

/// Problems found while decoding a snapshot. None of them abort the load.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The text is not JSON at all; everything falls back to defaults.
    #[error("snapshot is not valid JSON: {0}")]
    Unparseable(#[from] serde_json::Error),
    /// One field could not be read and was replaced by its default.
    #[error("snapshot field `{field}` is malformed: {reason}")]
    Malformed { field: &'static str, reason: String },
}

/// One object as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub tag: String,
    pub color: String,
    #[serde(default = "default_size")]
    pub size: [i32; 2],
    #[serde(default)]
    pub avatar: Option<String>,
}

fn default_size() -> [i32; 2] {
    [DEFAULT_OBJECT_SIZE.0, DEFAULT_OBJECT_SIZE.1]
}

/// One marker as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: String,
}

/// Full-state snapshot, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub placed_objects: BTreeMap<String, ObjectRecord>,
    pub terrain_cells: BTreeMap<String, TerrainType>,
    pub markers: BTreeMap<String, MarkerRecord>,
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom_factor: f64,
}

/// State recovered from a snapshot.
pub struct Decoded {
    pub store: EntityStore,
    pub viewport: Viewport,
    /// Everything that had to be defaulted, in the order found.
    pub issues: Vec<SnapshotError>,
}

/// Format a cell as a snapshot key.
#[must_use]
pub fn cell_key(cell: GridCoord) -> String {
    format!("{},{}", cell.x, cell.y)
}

/// Parse a `"x,y"` snapshot key. Whitespace around either number is allowed.
///
/// # Errors
///
/// Returns a description of the problem when the key is not two integers
/// separated by a comma or names a cell off the board.
pub fn parse_cell_key(key: &str) -> Result<GridCoord, String> {
    let (x, y) = key.split_once(',').ok_or_else(|| format!("key `{key}` has no comma"))?;
    let x: i32 = x.trim().parse().map_err(|e| format!("key `{key}`: {e}"))?;
    let y: i32 = y.trim().parse().map_err(|e| format!("key `{key}`: {e}"))?;
    GridCoord::checked(x, y).ok_or_else(|| format!("key `{key}` is outside the board"))
}

/// Capture the store and viewport.
#[must_use]
pub fn serialize(store: &EntityStore, viewport: &Viewport) -> Snapshot {
    let placed_objects = store
        .objects()
        .map(|(_, obj)| {
            let record = ObjectRecord {
                tag: obj.tag.clone(),
                color: obj.color.clone(),
                size: [obj.size.w, obj.size.h],
                avatar: obj.avatar.clone(),
            };
            (cell_key(obj.center), record)
        })
        .collect();
    let terrain_cells = store.terrain().map(|(cell, t)| (cell_key(cell), t)).collect();
    let markers = store
        .markers()
        .map(|(_, m)| {
            let record = MarkerRecord { x1: m.bbox.x1, y1: m.bbox.y1, x2: m.bbox.x2, y2: m.bbox.y2, color: m.color.clone() };
            (m.name.clone(), record)
        })
        .collect();
    Snapshot {
        placed_objects,
        terrain_cells,
        markers,
        pan_x: viewport.pan_x,
        pan_y: viewport.pan_y,
        zoom_factor: viewport.zoom,
    }
}

/// Serialize straight to JSON text.
///
/// # Errors
///
/// Propagates `serde_json` failures.
pub fn encode(store: &EntityStore, viewport: &Viewport) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serialize(store, viewport))
}

/// Decode snapshot text. `fallback` supplies viewport values the snapshot lacks.
#[must_use]
pub fn decode(text: &str, fallback: Viewport) -> Decoded {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => deserialize(&value, fallback),
        Err(err) => {
            warn!(%err, "snapshot unparseable; starting empty");
            Decoded { store: EntityStore::new(), viewport: fallback, issues: vec![SnapshotError::Unparseable(err)] }
        }
    }
}

/// Decode an already-parsed snapshot value.
#[must_use]
pub fn deserialize(value: &Value, fallback: Viewport) -> Decoded {
    let mut issues = Vec::new();
    let mut store = EntityStore::new();

    let Some(root) = value.as_object() else {
        report(&mut issues, "<root>", "expected a JSON object".to_owned());
        return Decoded { store, viewport: fallback, issues };
    };

    if let Some(objects) = section::<ObjectRecord>(root, "placed_objects", &mut issues) {
        match keyed_by_cell(objects) {
            Ok(objects) => {
                for (center, record) in objects {
                    store.restore_object(PlacedObject {
                        center,
                        tag: record.tag,
                        color: record.color,
                        size: Size::new(record.size[0], record.size[1]),
                        avatar: record.avatar,
                    });
                }
            }
            Err(reason) => report(&mut issues, "placed_objects", reason),
        }
    }

    if let Some(cells) = section::<TerrainType>(root, "terrain_cells", &mut issues) {
        match keyed_by_cell(cells) {
            Ok(cells) => {
                for (cell, terrain) in cells {
                    // keys are already bounds-checked
                    if let Err(err) = store.set_terrain(cell, terrain) {
                        report(&mut issues, "terrain_cells", err.to_string());
                    }
                }
            }
            Err(reason) => report(&mut issues, "terrain_cells", reason),
        }
    }

    if let Some(markers) = section::<MarkerRecord>(root, "markers", &mut issues) {
        for (name, m) in markers {
            store.upsert_marker(&name, Bbox::new(m.x1, m.y1, m.x2, m.y2), m.color);
        }
    }

    let viewport = Viewport {
        pan_x: scalar(root, "pan_x", &mut issues).unwrap_or(fallback.pan_x),
        pan_y: scalar(root, "pan_y", &mut issues).unwrap_or(fallback.pan_y),
        zoom: match scalar(root, "zoom_factor", &mut issues) {
            Some(z) if z > 0.0 => z,
            Some(z) => {
                report(&mut issues, "zoom_factor", format!("{z} is not positive"));
                1.0
            }
            None => fallback.zoom,
        },
    };

    Decoded { store, viewport, issues }
}

fn report(issues: &mut Vec<SnapshotError>, field: &'static str, reason: String) {
    warn!(field, %reason, "snapshot field degraded to default");
    issues.push(SnapshotError::Malformed { field, reason });
}

/// A name-keyed collection. `None` when absent (silently) or malformed (reported).
fn section<T: DeserializeOwned>(
    root: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<SnapshotError>,
) -> Option<BTreeMap<String, T>> {
    let value = root.get(field).filter(|v| !v.is_null())?;
    match BTreeMap::<String, T>::deserialize(value) {
        Ok(map) => Some(map),
        Err(err) => {
            report(issues, field, err.to_string());
            None
        }
    }
}

fn keyed_by_cell<T>(map: BTreeMap<String, T>) -> Result<Vec<(GridCoord, T)>, String> {
    map.into_iter().map(|(key, v)| parse_cell_key(&key).map(|cell| (cell, v))).collect()
}

/// A finite number. `None` when absent (silently) or unusable (reported).
fn scalar(root: &Map<String, Value>, field: &'static str, issues: &mut Vec<SnapshotError>) -> Option<f64> {
    let value = root.get(field).filter(|v| !v.is_null())?;
    match value.as_f64() {
        Some(n) if n.is_finite() => Some(n),
        _ => {
            report(issues, field, format!("expected a finite number, got {value}"));
            None
        }
    }
}

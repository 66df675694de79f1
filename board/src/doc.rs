//! Entity model and the store that owns everything placed on the board.
//!
//! Three kinds of content live here:
//!
//! - **Objects** (`PlacedObject`): tagged, colored footprints of whole cells
//!   addressed by an integer center. Footprints never overlap.
//! - **Markers** (`Marker`): free rectangles with a unique name and a
//!   fractional bounding box. They may overlap anything.
//! - **Terrain**: a painted layer keyed by cell. Not selectable or movable.
//!
//! Objects and markers share one arena keyed by a stable [`EntityId`]; their
//! position is a mutable field and the [`SpatialIndex`] is kept in step with
//! every move. Every mutation goes through [`EntityStore`] so the index never
//! drifts from the arena.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{GridCoord, Point};
use crate::consts::DEFAULT_OBJECT_SIZE;
use crate::index::SpatialIndex;

/// Stable identifier for an object or marker.
pub type EntityId = Uuid;

/// Errors returned by placement and edit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    /// The candidate footprint overlaps an existing object.
    #[error("cannot place at ({x}, {y}): space occupied by {blocker}")]
    Occupied { x: i32, y: i32, blocker: EntityId },
    /// The target cell lies outside the board.
    #[error("coordinate ({x}, {y}) is outside the board")]
    InvalidCoordinate { x: i32, y: i32 },
    /// No object or marker has this id.
    #[error("entity not found: {0}")]
    UnknownEntity(EntityId),
}

// =============================================================
// Geometry
// =============================================================

/// Object size in whole cells. Both axes are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    /// Build a size, raising either axis to 1 if smaller.
    #[must_use]
    pub fn new(w: i32, h: i32) -> Self {
        Self { w: w.max(1), h: h.max(1) }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_OBJECT_SIZE.0, DEFAULT_OBJECT_SIZE.1)
    }
}

/// The half-open range of cells an object occupies: `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Footprint {
    /// Footprint of an object of `size` centered on `center`.
    ///
    /// The lower edge sits `size / 2` cells below the center (integer
    /// division), so odd sizes are symmetric and even sizes lean up/right.
    #[must_use]
    pub fn of(center: GridCoord, size: Size) -> Self {
        let x0 = center.x - size.w / 2;
        let y0 = center.y - size.h / 2;
        Self { x0, y0, x1: x0 + size.w, y1: y0 + size.h }
    }

    /// Whether two footprints share at least one cell.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Whether `cell` is one of the occupied cells.
    #[must_use]
    pub fn contains_cell(&self, cell: GridCoord) -> bool {
        (self.x0..self.x1).contains(&cell.x) && (self.y0..self.y1).contains(&cell.y)
    }

    /// The footprint as a fractional grid box.
    #[must_use]
    pub fn to_bbox(self) -> Bbox {
        Bbox {
            x1: f64::from(self.x0),
            y1: f64::from(self.y0),
            x2: f64::from(self.x1),
            y2: f64::from(self.y1),
        }
    }
}

/// Axis-aligned box in fractional grid units. Normalized boxes have
/// `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bbox {
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The box spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y).normalized()
    }

    /// Swap coordinates so that `x1 <= x2` and `y1 <= y2`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Half-open point test: the low edges are inside, the high edges are not.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x < self.x2 && p.y >= self.y1 && p.y < self.y2
    }

    /// Point test for positions resolved from screen pixels. Screen rows grow
    /// downward, so a pixel on a cell's top row maps onto the cell's `y2` edge:
    /// X keeps `[x1, x2)` and Y becomes `(y1, y2]`.
    #[must_use]
    pub fn contains_screen_point(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x < self.x2 && p.y > self.y1 && p.y <= self.y2
    }

    /// Whether `inner` lies entirely within this box (shared edges count as inside).
    #[must_use]
    pub fn contains_bbox(&self, inner: &Bbox) -> bool {
        inner.x1 >= self.x1 && inner.x2 <= self.x2 && inner.y1 >= self.y1 && inner.y2 <= self.y2
    }

    /// The same box shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self { x1: self.x1 + dx, y1: self.y1 + dy, x2: self.x2 + dx, y2: self.y2 + dy }
    }
}

// =============================================================
// Entities
// =============================================================

/// Painted terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Mud,
    DarkMud,
}

/// Everything needed to place an object except its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpec {
    /// Display label.
    pub tag: String,
    /// CSS-style color string.
    pub color: String,
    /// Footprint size in cells.
    pub size: Size,
    /// Opaque image handle resolved by the host.
    pub avatar: Option<String>,
    /// When set, placing this spec first removes every object with the same tag.
    pub unique: bool,
}

impl ObjectSpec {
    /// A non-unique spec with the default size and no avatar.
    #[must_use]
    pub fn new(tag: impl Into<String>, color: impl Into<String>) -> Self {
        Self { tag: tag.into(), color: color.into(), size: Size::default(), avatar: None, unique: false }
    }

    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// An object on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedObject {
    pub center: GridCoord,
    pub tag: String,
    pub color: String,
    pub size: Size,
    pub avatar: Option<String>,
}

impl PlacedObject {
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::of(self.center, self.size)
    }
}

/// A named free-form rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    /// Always normalized.
    pub bbox: Bbox,
    pub color: String,
}

/// Payload of an arena entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Object(PlacedObject),
    Marker(Marker),
}

/// An arena entry: stable id, insertion order and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Monotonic insertion sequence; higher values are newer.
    pub seq: u64,
    pub kind: EntityKind,
}

impl Entity {
    /// Bounding box in fractional grid units.
    #[must_use]
    pub fn bbox(&self) -> Bbox {
        match &self.kind {
            EntityKind::Object(obj) => obj.footprint().to_bbox(),
            EntityKind::Marker(marker) => marker.bbox,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&PlacedObject> {
        match &self.kind {
            EntityKind::Object(obj) => Some(obj),
            EntityKind::Marker(_) => None,
        }
    }

    #[must_use]
    pub fn as_marker(&self) -> Option<&Marker> {
        match &self.kind {
            EntityKind::Marker(marker) => Some(marker),
            EntityKind::Object(_) => None,
        }
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, EntityKind::Object(_))
    }
}

// =============================================================
// Store
// =============================================================

/// Owner of all objects, markers and terrain.
pub struct EntityStore {
    entities: HashMap<EntityId, Entity>,
    marker_names: HashMap<String, EntityId>,
    terrain: HashMap<GridCoord, TerrainType>,
    index: SpatialIndex,
    next_seq: u64,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            marker_names: HashMap::new(),
            terrain: HashMap::new(),
            index: SpatialIndex::new(),
            next_seq: 0,
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn insert_entity(&mut self, kind: EntityKind) -> EntityId {
        let id = Uuid::new_v4();
        let seq = self.bump_seq();
        let entity = Entity { id, seq, kind };
        self.index.insert(id, &entity.bbox());
        if let EntityKind::Marker(marker) = &entity.kind {
            self.marker_names.insert(marker.name.clone(), id);
        }
        self.entities.insert(id, entity);
        id
    }

    // --- Objects ---

    /// Place an object centered on `center`.
    ///
    /// For a `unique` spec, every object already carrying the same tag is
    /// removed first. Those objects do not block the new footprint.
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if `center` is off the board; `Occupied` if the
    /// footprint overlaps any other object. On error the store is unchanged.
    pub fn place_object(&mut self, center: GridCoord, spec: &ObjectSpec) -> Result<EntityId, PlaceError> {
        if !center.in_bounds() {
            return Err(PlaceError::InvalidCoordinate { x: center.x, y: center.y });
        }

        let replaced: Vec<EntityId> = if spec.unique {
            self.objects()
                .filter(|(_, obj)| obj.tag == spec.tag)
                .map(|(id, _)| id)
                .collect()
        } else {
            Vec::new()
        };

        let footprint = Footprint::of(center, spec.size);
        if let Some(blocker) = self.first_overlap(&footprint, |id| replaced.contains(&id)) {
            return Err(PlaceError::Occupied { x: center.x, y: center.y, blocker });
        }

        for id in replaced {
            self.remove(id);
        }

        let id = self.insert_entity(EntityKind::Object(PlacedObject {
            center,
            tag: spec.tag.clone(),
            color: spec.color.clone(),
            size: spec.size,
            avatar: spec.avatar.clone(),
        }));
        Ok(id)
    }

    /// Insert an object without collision or bounds checks. Used when
    /// restoring a snapshot, which is trusted as written.
    pub fn restore_object(&mut self, object: PlacedObject) -> EntityId {
        self.insert_entity(EntityKind::Object(object))
    }

    /// Remove the object centered on `center`, if any.
    pub fn remove_object_at(&mut self, center: GridCoord) -> Option<EntityId> {
        let id = self.object_at_center(center)?;
        self.remove(id);
        Some(id)
    }

    /// The object centered exactly on `center`.
    #[must_use]
    pub fn object_at_center(&self, center: GridCoord) -> Option<EntityId> {
        self.index
            .query_point(Point::new(f64::from(center.x), f64::from(center.y)))
            .iter()
            .copied()
            .find(|id| {
                self.entities
                    .get(id)
                    .and_then(Entity::as_object)
                    .is_some_and(|obj| obj.center == center)
            })
    }

    /// First object (other than those `skip` accepts) whose footprint overlaps `footprint`.
    pub fn first_overlap<F>(&self, footprint: &Footprint, skip: F) -> Option<EntityId>
    where
        F: Fn(EntityId) -> bool,
    {
        self.index
            .query_rect(&footprint.to_bbox())
            .into_iter()
            .filter(|id| !skip(*id))
            .find(|id| {
                self.entities
                    .get(id)
                    .and_then(Entity::as_object)
                    .is_some_and(|obj| obj.footprint().overlaps(footprint))
            })
    }

    /// Move an object to a new center without checks; callers validate first.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` is not an object.
    pub fn move_object(&mut self, id: EntityId, center: GridCoord) -> Result<(), PlaceError> {
        let Some(EntityKind::Object(obj)) = self.entities.get_mut(&id).map(|e| &mut e.kind) else {
            return Err(PlaceError::UnknownEntity(id));
        };
        obj.center = center;
        let bbox = obj.footprint().to_bbox();
        self.index.insert(id, &bbox);
        Ok(())
    }

    /// Replace an object's tag.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` is not an object.
    pub fn set_tag(&mut self, id: EntityId, tag: impl Into<String>) -> Result<(), PlaceError> {
        let Some(EntityKind::Object(obj)) = self.entities.get_mut(&id).map(|e| &mut e.kind) else {
            return Err(PlaceError::UnknownEntity(id));
        };
        obj.tag = tag.into();
        Ok(())
    }

    // --- Terrain ---

    /// Paint `cell`, overwriting whatever was there.
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if `cell` is off the board.
    pub fn set_terrain(&mut self, cell: GridCoord, terrain: TerrainType) -> Result<(), PlaceError> {
        if !cell.in_bounds() {
            return Err(PlaceError::InvalidCoordinate { x: cell.x, y: cell.y });
        }
        self.terrain.insert(cell, terrain);
        Ok(())
    }

    /// Erase the terrain at `cell`, returning what was there.
    pub fn clear_terrain(&mut self, cell: GridCoord) -> Option<TerrainType> {
        self.terrain.remove(&cell)
    }

    #[must_use]
    pub fn terrain_at(&self, cell: GridCoord) -> Option<TerrainType> {
        self.terrain.get(&cell).copied()
    }

    /// All painted cells, unordered.
    pub fn terrain(&self) -> impl Iterator<Item = (GridCoord, TerrainType)> + '_ {
        self.terrain.iter().map(|(cell, t)| (*cell, *t))
    }

    #[must_use]
    pub fn terrain_len(&self) -> usize {
        self.terrain.len()
    }

    // --- Markers ---

    /// Create or overwrite the marker called `name`. The box is normalized
    /// before storage. Overwriting keeps the marker's id.
    pub fn upsert_marker(&mut self, name: &str, bbox: Bbox, color: impl Into<String>) -> EntityId {
        let bbox = bbox.normalized();
        let color = color.into();
        if let Some(id) = self.marker_names.get(name).copied() {
            if let Some(EntityKind::Marker(marker)) = self.entities.get_mut(&id).map(|e| &mut e.kind) {
                marker.bbox = bbox;
                marker.color = color;
                self.index.insert(id, &bbox);
                return id;
            }
        }
        self.insert_entity(EntityKind::Marker(Marker { name: name.to_owned(), bbox, color }))
    }

    /// Remove the marker called `name`, if any.
    pub fn remove_marker(&mut self, name: &str) -> Option<EntityId> {
        let id = self.marker_names.get(name).copied()?;
        self.remove(id);
        Some(id)
    }

    /// The marker called `name`.
    #[must_use]
    pub fn marker_by_name(&self, name: &str) -> Option<EntityId> {
        self.marker_names.get(name).copied()
    }

    /// Replace a marker's box (normalized on write).
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` is not a marker.
    pub fn move_marker(&mut self, id: EntityId, bbox: Bbox) -> Result<(), PlaceError> {
        let Some(EntityKind::Marker(marker)) = self.entities.get_mut(&id).map(|e| &mut e.kind) else {
            return Err(PlaceError::UnknownEntity(id));
        };
        marker.bbox = bbox.normalized();
        let bbox = marker.bbox;
        self.index.insert(id, &bbox);
        Ok(())
    }

    /// First name of the form `marker-N` (N from 1) not already taken.
    #[must_use]
    pub fn next_marker_name(&self) -> String {
        (1..)
            .map(|n| format!("marker-{n}"))
            .find(|name| !self.marker_names.contains_key(name))
            .unwrap_or_default()
    }

    // --- Shared ---

    /// Remove an object or marker by id, returning it if it was present.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.index.remove(id);
        if let EntityKind::Marker(marker) = &entity.kind {
            self.marker_names.remove(&marker.name);
        }
        Some(entity)
    }

    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// All objects, unordered.
    pub fn objects(&self) -> impl Iterator<Item = (EntityId, &PlacedObject)> + '_ {
        self.entities.values().filter_map(|e| e.as_object().map(|obj| (e.id, obj)))
    }

    /// All markers, unordered.
    pub fn markers(&self) -> impl Iterator<Item = (EntityId, &Marker)> + '_ {
        self.entities.values().filter_map(|e| e.as_marker().map(|m| (e.id, m)))
    }

    /// Objects and markers sorted oldest first, for draw order.
    #[must_use]
    pub fn sorted_entities(&self) -> Vec<&Entity> {
        let mut entities: Vec<&Entity> = self.entities.values().collect();
        entities.sort_by_key(|e| e.seq);
        entities
    }

    /// Index candidates near a grid point; callers must test exactly.
    pub(crate) fn candidates_at(&self, p: Point) -> impl Iterator<Item = &Entity> + '_ {
        self.index.query_point(p).iter().filter_map(|id| self.entities.get(id))
    }

    /// Index candidates near a grid box; callers must test exactly.
    pub(crate) fn candidates_in(&self, bbox: &Bbox) -> impl Iterator<Item = &Entity> + '_ {
        self.index
            .query_rect(bbox)
            .into_iter()
            .filter_map(|id| self.entities.get(&id))
    }

    /// Number of objects plus markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if there are no objects, markers or terrain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.terrain.is_empty()
    }

    /// Drop all content.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.marker_names.clear();
        self.terrain.clear();
        self.index.clear();
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

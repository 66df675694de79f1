//! Live drag of the selected entities.
//!
//! A [`DragSession`] is opened on press. It records the press point and the
//! position of every selected entity at that moment. Each motion event
//! measures the total pixel delta from the press point, converts it to a grid
//! delta (Y negated) and writes `origin + delta` back into the store:
//! rounded for objects, unrounded for markers. There is no commit step;
//! dropping the session ends the drag.
//!
//! A tick is applied to the whole group or not at all. It is skipped when any
//! moved object would leave the board or overlap an object outside the
//! group, so the group stays at its last valid position.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use tracing::debug;

use crate::camera::{GridCoord, Point, Viewport};
use crate::doc::{Bbox, EntityId, EntityKind, EntityStore, Footprint, Size};
use crate::selection::Selection;

/// Position of one dragged entity at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Origin {
    /// Object center in fractional grid units.
    Object { center: Point, size: Size },
    /// Marker box as stored.
    Marker(Bbox),
}

/// What a motion tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// These entities changed position.
    Moved(Vec<EntityId>),
    /// The tick would have produced an invalid layout and was dropped.
    Blocked,
    /// Nothing changed (e.g. the rounded object positions are the same).
    Unchanged,
}

/// State captured at the start of a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    press: Point,
    origins: Vec<(EntityId, Origin)>,
}

impl DragSession {
    /// Snapshot every selected entity's current position.
    #[must_use]
    pub fn begin(store: &EntityStore, selection: &Selection, press: Point) -> Self {
        let origins = selection
            .iter()
            .filter_map(|id| {
                let entity = store.get(&id)?;
                let origin = match &entity.kind {
                    EntityKind::Object(obj) => Origin::Object {
                        center: Point::new(f64::from(obj.center.x), f64::from(obj.center.y)),
                        size: obj.size,
                    },
                    EntityKind::Marker(marker) => Origin::Marker(marker.bbox),
                };
                Some((id, origin))
            })
            .collect();
        Self { press, origins }
    }

    /// Screen point where the drag started.
    #[must_use]
    pub fn press(&self) -> Point {
        self.press
    }

    /// Ids being dragged.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.origins.iter().map(|(id, _)| *id)
    }

    /// Recorded start position of `id`.
    #[must_use]
    pub fn origin(&self, id: &EntityId) -> Option<Origin> {
        self.origins.iter().find(|(e, _)| e == id).map(|(_, o)| *o)
    }

    /// Move the group so that it follows the pointer at `screen`.
    pub fn apply(&self, store: &mut EntityStore, viewport: &Viewport, screen: Point) -> DragOutcome {
        let delta = viewport.screen_delta_to_grid(screen.x - self.press.x, screen.y - self.press.y);

        let mut object_moves: Vec<(EntityId, GridCoord)> = Vec::new();
        let mut marker_moves: Vec<(EntityId, Bbox)> = Vec::new();
        for (id, origin) in &self.origins {
            match origin {
                Origin::Object { center, size } => {
                    let target = round_to_cell(center.x + delta.x, center.y + delta.y);
                    if !target.in_bounds() {
                        debug!(%id, x = target.x, y = target.y, "drag tick leaves the board; dropped");
                        return DragOutcome::Blocked;
                    }
                    let footprint = Footprint::of(target, *size);
                    let moving = |other: EntityId| self.origins.iter().any(|(e, _)| *e == other);
                    if let Some(blocker) = store.first_overlap(&footprint, moving) {
                        debug!(%id, %blocker, x = target.x, y = target.y, "drag tick collides; dropped");
                        return DragOutcome::Blocked;
                    }
                    let current = store.get(id).and_then(|e| e.as_object()).map(|obj| obj.center);
                    if current != Some(target) {
                        object_moves.push((*id, target));
                    }
                }
                Origin::Marker(bbox) => {
                    let target = bbox.translated(delta.x, delta.y);
                    let current = store.get(id).and_then(|e| e.as_marker()).map(|m| m.bbox);
                    if current != Some(target) {
                        marker_moves.push((*id, target));
                    }
                }
            }
        }

        let mut moved = Vec::with_capacity(object_moves.len() + marker_moves.len());
        for (id, center) in object_moves {
            if store.move_object(id, center).is_ok() {
                moved.push(id);
            }
        }
        for (id, bbox) in marker_moves {
            if store.move_marker(id, bbox).is_ok() {
                moved.push(id);
            }
        }

        if moved.is_empty() { DragOutcome::Unchanged } else { DragOutcome::Moved(moved) }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_cell(x: f64, y: f64) -> GridCoord {
    GridCoord::new(x.round() as i32, y.round() as i32)
}

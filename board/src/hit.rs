//! Hit-testing of screen points and rectangles against board entities.
//!
//! Point hits resolve a single entity: objects win over markers, and among
//! entities of the same kind the most recently inserted one wins. Rectangle
//! hits implement rubber-band semantics: an entity is hit only when its whole
//! bounding box lies inside the rectangle.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Viewport};
use crate::doc::{Bbox, EntityId, EntityStore};

/// Topmost entity under a screen point.
///
/// Uses the same row flooring as [`Viewport::screen_to_cell`], so the pixel a
/// cell was placed from always hits that cell.
#[must_use]
pub fn point_hit(store: &EntityStore, viewport: &Viewport, screen: Point) -> Option<EntityId> {
    let grid = viewport.screen_to_grid(screen);
    topmost(store, grid, |b| b.contains_screen_point(grid))
}

/// Topmost entity containing a fractional grid point.
#[must_use]
pub fn point_hit_grid(store: &EntityStore, grid: Point) -> Option<EntityId> {
    topmost(store, grid, |b| b.contains_point(grid))
}

fn topmost(store: &EntityStore, grid: Point, contains: impl Fn(&Bbox) -> bool) -> Option<EntityId> {
    store
        .candidates_at(grid)
        .filter(|e| contains(&e.bbox()))
        .max_by_key(|e| (e.is_object(), e.seq))
        .map(|e| e.id)
}

/// Entities fully inside the screen rectangle spanned by `a` and `b`.
#[must_use]
pub fn rect_hit(store: &EntityStore, viewport: &Viewport, a: Point, b: Point) -> Vec<EntityId> {
    let rect = Bbox::from_corners(viewport.screen_to_grid(a), viewport.screen_to_grid(b));
    rect_hit_grid(store, &rect)
}

/// Entities whose bounding box lies inside `rect` (grid space), oldest first.
#[must_use]
pub fn rect_hit_grid(store: &EntityStore, rect: &Bbox) -> Vec<EntityId> {
    let rect = rect.normalized();
    let mut hits: Vec<_> = store
        .candidates_in(&rect)
        .filter(|e| rect.contains_bbox(&e.bbox()))
        .map(|e| (e.seq, e.id))
        .collect();
    hits.sort_unstable();
    hits.into_iter().map(|(_, id)| id).collect()
}

//! Scene geometry: what the renderer should draw, in screen pixels.
//!
//! [`build`] takes read-only views of the engine and produces a display list
//! in paint order. It does not touch any drawing surface and does not mutate
//! state. Layers, bottom first:
//!
//! 1. terrain cells in view
//! 2. grid lines (major every [`MAJOR_GRID_EVERY`] cells, minor lines only
//!    once a cell is at least [`GridStyle::minor_threshold_px`] wide)
//! 3. markers, then objects, each oldest first
//! 4. overlays: rubber band, marker-draw preview, placement preview

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::ops::Range;

use crate::camera::{GridCoord, Point, Viewport};
use crate::consts::{GRID_SIZE, MAJOR_GRID_EVERY};
use crate::doc::{Bbox, EntityId, EntityKind, TerrainType};
use crate::engine::Engine;
use crate::input::{GridStyle, InputState, Tool};

/// Axis-aligned rectangle in screen pixels, `(x, y)` at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ScreenRect {
    /// Whether any part of the rectangle falls inside a `width × height` surface.
    #[must_use]
    pub fn intersects_surface(&self, width: f64, height: f64) -> bool {
        self.x < width && self.y < height && self.x + self.w > 0.0 && self.y + self.h > 0.0
    }
}

/// Screen rectangle covered by one cell.
#[must_use]
pub fn cell_rect(viewport: &Viewport, cell: GridCoord) -> ScreenRect {
    let s = viewport.cell_px();
    let top_left = viewport.cell_to_screen(cell);
    ScreenRect { x: top_left.x, y: top_left.y, w: s, h: s }
}

/// Screen rectangle covered by a grid box.
#[must_use]
pub fn bbox_rect(viewport: &Viewport, bbox: &Bbox) -> ScreenRect {
    let s = viewport.cell_px();
    let bbox = bbox.normalized();
    let top_left = viewport.grid_to_screen(Point::new(bbox.x1, bbox.y2));
    ScreenRect { x: top_left.x, y: top_left.y, w: bbox.width() * s, h: bbox.height() * s }
}

/// Cells at least partly visible on a `width × height` surface, clamped to
/// the board. Either range may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleCells {
    pub xs: Range<i32>,
    pub ys: Range<i32>,
}

impl VisibleCells {
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        self.xs.contains(&cell.x) && self.ys.contains(&cell.y)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() || self.ys.is_empty()
    }
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn visible_cells(viewport: &Viewport, width: f64, height: f64) -> VisibleCells {
    let top_left = viewport.screen_to_grid(Point::new(0.0, 0.0));
    let bottom_right = viewport.screen_to_grid(Point::new(width, height));
    let clamp = |v: f64| v.clamp(0.0, f64::from(GRID_SIZE)) as i32;
    VisibleCells {
        xs: clamp(top_left.x.floor())..clamp(bottom_right.x.ceil()),
        ys: clamp(bottom_right.y.floor())..clamp(top_left.y.ceil()),
    }
}

/// Whether minor grid lines are drawn at this zoom.
#[must_use]
pub fn minor_grid_visible(viewport: &Viewport, style: &GridStyle) -> bool {
    viewport.cell_px() >= style.minor_threshold_px
}

/// Whether the line at grid index `i` is a major line.
#[must_use]
pub fn is_major_line(i: i32) -> bool {
    i % MAJOR_GRID_EVERY == 0
}

/// One item of the display list.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Terrain { rect: ScreenRect, terrain: TerrainType },
    GridLine { from: Point, to: Point, major: bool },
    Marker { id: EntityId, rect: ScreenRect, name: String, color: String, selected: bool },
    Object { id: EntityId, rect: ScreenRect, tag: String, color: String, avatar: Option<String>, selected: bool },
    RubberBand(ScreenRect),
    MarkerPreview { rect: ScreenRect, color: String },
    /// Translucent "shadow" of the object the place tool would stamp.
    PlacementPreview { rect: ScreenRect, tag: String, color: String, blocked: bool },
}

/// Display list for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
}

impl Scene {
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Build the display list for a `width × height` surface.
#[must_use]
pub fn build(engine: &Engine, width: f64, height: f64) -> Scene {
    let viewport = engine.viewport();
    let visible = visible_cells(&viewport, width, height);
    let mut shapes = Vec::new();

    // Layer 1: terrain.
    let mut terrain: Vec<(GridCoord, TerrainType)> =
        engine.store.terrain().filter(|(cell, _)| visible.contains(*cell)).collect();
    terrain.sort_unstable_by_key(|(cell, _)| *cell);
    shapes.extend(terrain.into_iter().map(|(cell, terrain)| Shape::Terrain { rect: cell_rect(&viewport, cell), terrain }));

    // Layer 2: grid lines.
    if !visible.is_empty() {
        grid_lines(&viewport, &engine.ui.grid, &visible, &mut shapes);
    }

    // Layer 3: markers under objects.
    let entities = engine.store.sorted_entities();
    for entity in &entities {
        if let EntityKind::Marker(marker) = &entity.kind {
            let rect = bbox_rect(&viewport, &marker.bbox);
            if rect.intersects_surface(width, height) {
                shapes.push(Shape::Marker {
                    id: entity.id,
                    rect,
                    name: marker.name.clone(),
                    color: marker.color.clone(),
                    selected: engine.selection().contains(&entity.id),
                });
            }
        }
    }
    for entity in &entities {
        if let EntityKind::Object(obj) = &entity.kind {
            let rect = bbox_rect(&viewport, &obj.footprint().to_bbox());
            if rect.intersects_surface(width, height) {
                shapes.push(Shape::Object {
                    id: entity.id,
                    rect,
                    tag: obj.tag.clone(),
                    color: obj.color.clone(),
                    avatar: obj.avatar.clone(),
                    selected: engine.selection().contains(&entity.id),
                });
            }
        }
    }

    // Layer 4: overlays.
    if let Some(band) = engine.rubber_band() {
        shapes.push(Shape::RubberBand(bbox_rect(&viewport, &band)));
    }
    if let (Some(preview), InputState::DrawingMarker { color, .. }) = (engine.marker_preview(), &engine.input) {
        shapes.push(Shape::MarkerPreview { rect: bbox_rect(&viewport, &preview), color: color.clone() });
    }
    if let (Some(preview), Tool::PlaceObject(spec)) = (engine.placement_preview(), &engine.ui.tool) {
        shapes.push(Shape::PlacementPreview {
            rect: bbox_rect(&viewport, &preview.footprint.to_bbox()),
            tag: spec.tag.clone(),
            color: spec.color.clone(),
            blocked: preview.blocked,
        });
    }

    Scene { shapes }
}

fn grid_lines(viewport: &Viewport, style: &GridStyle, visible: &VisibleCells, shapes: &mut Vec<Shape>) {
    let minor = minor_grid_visible(viewport, style);
    let (y_lo, y_hi) = (f64::from(visible.ys.start), f64::from(visible.ys.end));
    let (x_lo, x_hi) = (f64::from(visible.xs.start), f64::from(visible.xs.end));

    for i in visible.xs.start..=visible.xs.end {
        let major = is_major_line(i);
        if major || minor {
            let x = f64::from(i);
            let from = viewport.grid_to_screen(Point::new(x, y_hi));
            let to = viewport.grid_to_screen(Point::new(x, y_lo));
            shapes.push(Shape::GridLine { from, to, major });
        }
    }
    for i in visible.ys.start..=visible.ys.end {
        let major = is_major_line(i);
        if major || minor {
            let y = f64::from(i);
            let from = viewport.grid_to_screen(Point::new(x_lo, y));
            let to = viewport.grid_to_screen(Point::new(x_hi, y));
            shapes.push(Shape::GridLine { from, to, major });
        }
    }
}

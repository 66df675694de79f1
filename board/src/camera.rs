//! Viewport transform between pixel space and grid space.
//!
//! Pixel space is the rendering surface: origin at the top-left, Y grows
//! downward. Grid space is the board: integer cells `0..GRID_SIZE` on both
//! axes with Y growing upward. The transform is a pan offset (pixels) and a
//! zoom factor applied to the fixed [`CELL_SIZE`].
//!
//! Two flavours of grid coordinate are used throughout the crate:
//!
//! - [`GridCoord`] names a whole cell. [`Viewport::screen_to_cell`] produces it.
//! - A fractional grid [`Point`] addresses positions inside and between cells.
//!   Cell `(x, y)` covers `[x, x + 1) × [y, y + 1)` in that space. Hit-testing,
//!   marker boxes and drag deltas work in fractional grid units.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{CELL_SIZE, GRID_SIZE, ZOOM_IN_STEP, ZOOM_OUT_STEP};

/// A point in either screen or fractional grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An integer cell address on the board.
///
/// Values outside `0..GRID_SIZE` are representable so that callers can test
/// and drop them; see [`GridCoord::in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether both axes lie inside `0..GRID_SIZE`.
    #[must_use]
    pub fn in_bounds(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }

    /// The cell at `(x, y)`, or `None` when it falls off the board.
    #[must_use]
    pub fn checked(x: i32, y: i32) -> Option<Self> {
        let coord = Self { x, y };
        coord.in_bounds().then_some(coord)
    }
}

/// Direction of a single zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Magnify by [`ZOOM_IN_STEP`].
    In,
    /// Shrink by [`ZOOM_OUT_STEP`].
    Out,
}

impl ZoomDirection {
    /// The multiplier this direction applies to the zoom factor.
    #[must_use]
    pub fn step(self) -> f64 {
        match self {
            Self::In => ZOOM_IN_STEP,
            Self::Out => ZOOM_OUT_STEP,
        }
    }
}

/// Pan/zoom state for the board.
///
/// `pan_x` / `pan_y` are in pixels and locate the top-left corner of the
/// board on screen. `zoom` scales [`CELL_SIZE`] and is always strictly
/// positive. Neither pan nor zoom is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    /// A zoom-1 viewport that puts the top-left corner of `cell` at `anchor`.
    #[must_use]
    pub fn centered_on(cell: GridCoord, anchor: Point) -> Self {
        let mut viewport = Self::default();
        viewport.center_on(cell, anchor);
        viewport
    }

    /// Pixels per cell at the current zoom.
    #[must_use]
    pub fn cell_px(&self) -> f64 {
        CELL_SIZE * self.zoom
    }

    /// The cell under a screen point. May lie outside the board.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn screen_to_cell(&self, screen: Point) -> GridCoord {
        let s = self.cell_px();
        let col = ((screen.x - self.pan_x) / s).floor() as i32;
        let row = ((screen.y - self.pan_y) / s).floor() as i32;
        GridCoord { x: col, y: GRID_SIZE - row - 1 }
    }

    /// The in-bounds cell under a screen point, if any.
    #[must_use]
    pub fn cell_at(&self, screen: Point) -> Option<GridCoord> {
        let cell = self.screen_to_cell(screen);
        cell.in_bounds().then_some(cell)
    }

    /// Screen position of the top-left corner of `cell`.
    #[must_use]
    pub fn cell_to_screen(&self, cell: GridCoord) -> Point {
        let s = self.cell_px();
        Point {
            x: f64::from(cell.x) * s + self.pan_x,
            y: f64::from(GRID_SIZE - cell.y - 1) * s + self.pan_y,
        }
    }

    /// Screen position of the middle of `cell`.
    #[must_use]
    pub fn cell_center_to_screen(&self, cell: GridCoord) -> Point {
        let half = self.cell_px() * 0.5;
        let corner = self.cell_to_screen(cell);
        Point { x: corner.x + half, y: corner.y + half }
    }

    /// Convert a screen point to fractional grid space (Y up).
    #[must_use]
    pub fn screen_to_grid(&self, screen: Point) -> Point {
        let s = self.cell_px();
        Point {
            x: (screen.x - self.pan_x) / s,
            y: f64::from(GRID_SIZE) - (screen.y - self.pan_y) / s,
        }
    }

    /// Convert a fractional grid point to screen space.
    #[must_use]
    pub fn grid_to_screen(&self, grid: Point) -> Point {
        let s = self.cell_px();
        Point {
            x: grid.x * s + self.pan_x,
            y: (f64::from(GRID_SIZE) - grid.y) * s + self.pan_y,
        }
    }

    /// Convert a pixel delta to a grid delta. Y is negated.
    #[must_use]
    pub fn screen_delta_to_grid(&self, dx: f64, dy: f64) -> Point {
        let s = self.cell_px();
        Point { x: dx / s, y: -dy / s }
    }

    /// The integer grid corner nearest to a screen point, in grid space.
    #[must_use]
    pub fn snap_to_corner(&self, screen: Point) -> Point {
        let grid = self.screen_to_grid(screen);
        Point { x: grid.x.round(), y: grid.y.round() }
    }

    /// Zoom one step about `cursor`, keeping the grid point under it fixed.
    pub fn zoom_at(&mut self, cursor: Point, direction: ZoomDirection) {
        let s = self.cell_px();
        let rel_x = (cursor.x - self.pan_x) / s;
        let rel_y = (cursor.y - self.pan_y) / s;
        self.zoom *= direction.step();
        let s = self.cell_px();
        self.pan_x = cursor.x - rel_x * s;
        self.pan_y = cursor.y - rel_y * s;
    }

    /// Shift the board by a pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Re-pan so the top-left corner of `cell` sits at `anchor`, keeping zoom.
    pub fn center_on(&mut self, cell: GridCoord, anchor: Point) {
        let s = self.cell_px();
        self.pan_x = anchor.x - f64::from(cell.x) * s;
        self.pan_y = anchor.y - f64::from(GRID_SIZE - cell.y - 1) * s;
    }
}

//! Shared numeric constants for the board crate.

// ── Grid ────────────────────────────────────────────────────────

/// Width and height of the square board, in cells.
pub const GRID_SIZE: i32 = 999;

/// Edge length of one cell in pixels at zoom 1.0.
pub const CELL_SIZE: f64 = 10.0;

/// Footprint used when an object spec does not name a size.
pub const DEFAULT_OBJECT_SIZE: (i32, i32) = (3, 3);

/// Cell shown at the start anchor when no saved viewport exists.
pub const DEFAULT_START_CELL: (i32, i32) = (GRID_SIZE / 2, GRID_SIZE / 2);

/// Screen position (both axes, pixels) where the start cell lands.
pub const START_ANCHOR_PX: f64 = 400.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Multiplier applied to the zoom factor per wheel notch towards the board.
pub const ZOOM_IN_STEP: f64 = 1.1;

/// Multiplier applied to the zoom factor per wheel notch away from the board.
pub const ZOOM_OUT_STEP: f64 = 0.9;

// ── Spatial index ───────────────────────────────────────────────

/// Edge length of one spatial-index bucket, in cells.
pub const BUCKET_CELLS: i32 = 32;

// ── Rendering geometry ──────────────────────────────────────────

/// Default cell width, in pixels, below which minor grid lines are hidden.
pub const MINOR_GRID_MIN_CELL_PX: f64 = 2.0;

/// Upper bound for the operator-set minor grid threshold.
pub const MINOR_GRID_MAX_THRESHOLD_PX: f64 = 10.0;

/// Every n-th grid line is a major line.
pub const MAJOR_GRID_EVERY: i32 = 9;

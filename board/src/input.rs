//! Input model: tools, mouse buttons, keys, and the gesture state machine.
//!
//! `Tool` captures the operator's mode at the time of a pointer event and is
//! the only thing the engine consults to pick a gesture handler. `InputState`
//! is the gesture being tracked between pointer-down and pointer-up, carrying
//! everything needed to compute incremental updates and finish on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::{MINOR_GRID_MAX_THRESHOLD_PX, MINOR_GRID_MIN_CELL_PX};
use crate::doc::{Bbox, ObjectSpec, TerrainType};
use crate::drag::DragSession;
use crate::selection::{RubberBand, Selection};

/// Which tool is currently active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Stamp an object on the clicked cell.
    PlaceObject(ObjectSpec),
    /// Paint the clicked cell with terrain.
    PaintTerrain(TerrainType),
    /// Remove whatever is under the click.
    Delete,
    /// Drag out a marker rectangle snapped to grid corners.
    DrawMarker {
        /// Color given to markers drawn with this tool.
        color: String,
    },
}

impl Tool {
    /// Whether this tool turns primary presses into selection and drag.
    #[must_use]
    pub fn is_select(&self) -> bool {
        matches!(self, Self::Select)
    }

    /// Short label for status displays.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Select => "Select".to_owned(),
            Self::PlaceObject(spec) => format!("Object ({})", spec.tag),
            Self::PaintTerrain(TerrainType::Mud) => "Terrain (mud)".to_owned(),
            Self::PaintTerrain(TerrainType::DarkMud) => "Terrain (dark_mud)".to_owned(),
            Self::Delete => "Delete Mode".to_owned(),
            Self::DrawMarker { .. } => "Marker".to_owned(),
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button.
    Primary,
    /// Middle mouse button (scroll wheel click); always pans.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Whether this key removes the selection.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Currently selected objects and markers.
    pub selection: Selection,
    /// Last pointer position seen, in screen space.
    pub hover: Option<Point>,
    /// Operator grid settings.
    pub grid: GridStyle,
}

/// Operator-adjustable grid settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    /// Minor lines are drawn only when a cell is at least this many pixels wide.
    pub minor_threshold_px: f64,
}

impl GridStyle {
    /// Style with the threshold clamped to `0..=MINOR_GRID_MAX_THRESHOLD_PX`.
    /// A NaN threshold keeps the default.
    #[must_use]
    pub fn with_minor_threshold(px: f64) -> Self {
        if px.is_nan() {
            return Self::default();
        }
        Self { minor_threshold_px: px.clamp(0.0, MINOR_GRID_MAX_THRESHOLD_PX) }
    }
}

impl Default for GridStyle {
    fn default() -> Self {
        Self { minor_threshold_px: MINOR_GRID_MIN_CELL_PX }
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Middle-button drag is moving the viewport.
    Panning {
        /// Screen position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// Selected entities follow the pointer.
    Dragging(DragSession),
    /// A rubber-band rectangle is being dragged out from empty space.
    RubberBand(RubberBand),
    /// A marker rectangle is being drawn.
    DrawingMarker {
        /// Grid corner where the press landed.
        anchor: Point,
        /// Grid corner nearest the latest pointer position.
        current: Point,
        /// Color of the marker to create.
        color: String,
    },
}

impl InputState {
    /// Preview box of an in-progress marker draw, in grid space.
    #[must_use]
    pub fn marker_preview(&self) -> Option<Bbox> {
        match self {
            Self::DrawingMarker { anchor, current, .. } => Some(Bbox::from_corners(*anchor, *current)),
            _ => None,
        }
    }

    /// Whether no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

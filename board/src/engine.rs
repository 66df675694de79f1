//! Board engine: owns the store, viewport and UI state, and turns raw input
//! events into store mutations.
//!
//! DESIGN
//! ======
//! Every pointer event goes through one dispatch. Middle button always pans.
//! Secondary button runs the right-click rules. Primary button is routed by
//! the active [`Tool`]. Handlers return a list of [`Action`]s for the host to
//! act on (redraw, show a refusal, open a dialog). The engine itself never
//! blocks, so a checkpoint between two events always sees a consistent state.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info, trace};

use crate::camera::{GridCoord, Point, Viewport, ZoomDirection};
use crate::codec::{self, Decoded, Snapshot, SnapshotError};
use crate::doc::{Bbox, Entity, EntityId, EntityStore, Footprint, ObjectSpec, PlaceError, TerrainType};
use crate::drag::{DragOutcome, DragSession};
use crate::hit;
use crate::input::{Button, GridStyle, InputState, Key, Tool, UiState, WheelDelta};
use crate::selection::{PressOutcome, RubberBand, SecondaryOutcome, Selection};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Something visible changed.
    RenderNeeded,
    ObjectCreated(EntityId),
    /// A placement was refused; the host should tell the operator.
    PlacementRefused(PlaceError),
    EntitiesMoved(Vec<EntityId>),
    EntityDeleted(EntityId),
    MarkerCreated(EntityId),
    TerrainPainted(GridCoord),
    SelectionChanged,
    /// Right-click on an entity with nothing selected.
    ContextMenuRequested { id: EntityId, screen: Point },
    /// Double-click on an object; the host shows a text dialog and calls
    /// [`Engine::set_tag`] with the answer.
    EditTagRequested { id: EntityId, tag: String },
    ToolChanged,
}

/// Where the active place tool would put its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPreview {
    pub center: GridCoord,
    pub footprint: Footprint,
    /// `true` when placing here would be refused.
    pub blocked: bool,
}

/// Core engine state.
#[derive(Default)]
pub struct Engine {
    /// Board contents. Mutate through the `Engine` methods so the selection
    /// and any drag stay consistent; direct edits are reconciled on the next
    /// input event or by [`Engine::sync_with_store`].
    pub store: EntityStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty board shown through `viewport`.
    #[must_use]
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self { viewport, ..Self::default() }
    }

    /// Drop selected ids and any drag that reference entities the store no
    /// longer holds. Returns whether the selection shrank.
    pub fn sync_with_store(&mut self) -> bool {
        let before = self.ui.selection.len();
        self.ui.selection.retain_existing(&self.store);
        if matches!(&self.input, InputState::Dragging(session) if session.ids().any(|id| !self.store.contains(&id))) {
            self.input = InputState::Idle;
        }
        before != self.ui.selection.len()
    }

    // --- Data inputs ---

    /// Set the active tool, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        debug!(tool = %tool.label(), "tool changed");
        self.ui.tool = tool;
        self.input = InputState::Idle;
    }

    /// Set the cell width below which minor grid lines are hidden, clamped
    /// to `0..=10` pixels.
    pub fn set_minor_grid_threshold(&mut self, px: f64) -> Vec<Action> {
        let grid = GridStyle::with_minor_threshold(px);
        if grid == self.ui.grid {
            return Vec::new();
        }
        debug!(threshold = grid.minor_threshold_px, "minor grid threshold changed");
        self.ui.grid = grid;
        vec![Action::RenderNeeded]
    }

    /// Place an object directly (dialog or roster path).
    ///
    /// # Errors
    ///
    /// Propagates [`EntityStore::place_object`] errors; nothing changes on error.
    pub fn place_object(&mut self, center: GridCoord, spec: &ObjectSpec) -> Result<EntityId, PlaceError> {
        let id = self.store.place_object(center, spec)?;
        self.ui.selection.retain_existing(&self.store);
        debug!(%id, x = center.x, y = center.y, tag = %spec.tag, "object placed");
        Ok(id)
    }

    /// Create or overwrite a named marker.
    pub fn upsert_marker(&mut self, name: &str, bbox: Bbox, color: impl Into<String>) -> EntityId {
        let id = self.store.upsert_marker(name, bbox, color);
        debug!(%id, name, "marker upserted");
        id
    }

    /// Remove a named marker, dropping it from the selection.
    pub fn remove_marker(&mut self, name: &str) -> Option<EntityId> {
        let id = self.store.remove_marker(name)?;
        self.ui.selection.remove(&id);
        debug!(%id, name, "marker removed");
        Some(id)
    }

    /// Remove the object centered on `center`. Absent objects are not an error.
    pub fn remove_object_at(&mut self, center: GridCoord) -> Option<EntityId> {
        let id = self.store.remove_object_at(center)?;
        self.ui.selection.remove(&id);
        debug!(%id, x = center.x, y = center.y, "object removed");
        Some(id)
    }

    /// Remove any entity by id, dropping it from the selection and from an
    /// in-progress drag.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        self.ui.selection.remove(&id);
        if matches!(&self.input, InputState::Dragging(session) if session.ids().any(|e| e == id)) {
            self.input = InputState::Idle;
        }
        debug!(%id, "entity removed");
        true
    }

    /// Commit a new tag from the host's edit dialog.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` is not an object.
    pub fn set_tag(&mut self, id: EntityId, tag: impl Into<String>) -> Result<(), PlaceError> {
        self.store.set_tag(id, tag)
    }

    /// Paint one terrain cell.
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if `cell` is off the board.
    pub fn paint_terrain(&mut self, cell: GridCoord, terrain: TerrainType) -> Result<(), PlaceError> {
        self.store.set_terrain(cell, terrain)
    }

    // --- Snapshot ---

    /// Encode the current board and viewport.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        codec::serialize(&self.store, &self.viewport)
    }

    /// Replace the board and viewport with a decoded snapshot. Selection and
    /// any gesture in progress are dropped. Returns the decode issues.
    pub fn restore(&mut self, decoded: Decoded) -> Vec<SnapshotError> {
        let Decoded { store, viewport, issues } = decoded;
        self.store = store;
        self.viewport = viewport;
        self.ui.selection.clear();
        self.input = InputState::Idle;
        issues
    }

    // --- Input events ---

    /// Pointer pressed at `screen`.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button) -> Vec<Action> {
        self.sync_with_store();
        self.ui.hover = Some(screen);
        match button {
            Button::Middle => {
                self.input = InputState::Panning { last_screen: screen };
                Vec::new()
            }
            Button::Secondary => self.on_secondary_down(screen),
            Button::Primary => match self.ui.tool.clone() {
                Tool::Select => self.on_select_down(screen),
                Tool::PlaceObject(spec) => self.place_at(screen, &spec),
                Tool::PaintTerrain(terrain) => self.paint_at(screen, terrain),
                Tool::Delete => self.delete_at(screen),
                Tool::DrawMarker { color } => self.begin_marker(screen, color),
            },
        }
    }

    /// Pointer moved to `screen`.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        self.sync_with_store();
        self.ui.hover = Some(screen);
        match &mut self.input {
            InputState::Idle => {
                if matches!(self.ui.tool, Tool::PlaceObject(_)) {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen.x - last_screen.x, screen.y - last_screen.y);
                *last_screen = screen;
                self.viewport.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Dragging(session) => match session.apply(&mut self.store, &self.viewport, screen) {
                DragOutcome::Moved(ids) => vec![Action::EntitiesMoved(ids), Action::RenderNeeded],
                DragOutcome::Blocked | DragOutcome::Unchanged => Vec::new(),
            },
            InputState::RubberBand(band) => {
                band.current = screen;
                vec![Action::RenderNeeded]
            }
            InputState::DrawingMarker { current, .. } => {
                *current = self.viewport.snap_to_corner(screen);
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Pointer released at `screen`.
    pub fn on_pointer_up(&mut self, screen: Point, button: Button) -> Vec<Action> {
        self.sync_with_store();
        self.ui.hover = Some(screen);
        match (std::mem::take(&mut self.input), button) {
            (InputState::Panning { .. }, Button::Middle) | (InputState::Dragging(_), Button::Primary) => Vec::new(),
            (InputState::RubberBand(mut band), Button::Primary) => {
                band.current = screen;
                let ids = hit::rect_hit_grid(&self.store, &band.grid_rect(&self.viewport));
                debug!(count = ids.len(), "rubber-band selection");
                self.ui.selection.replace(ids);
                vec![Action::SelectionChanged, Action::RenderNeeded]
            }
            (InputState::DrawingMarker { anchor, color, .. }, Button::Primary) => {
                let bbox = Bbox::from_corners(anchor, self.viewport.snap_to_corner(screen));
                if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
                    trace!("degenerate marker discarded");
                    return vec![Action::RenderNeeded];
                }
                let name = self.store.next_marker_name();
                let id = self.store.upsert_marker(&name, bbox, color);
                debug!(%id, %name, "marker drawn");
                vec![Action::MarkerCreated(id), Action::RenderNeeded]
            }
            (state, _) => {
                self.input = state;
                Vec::new()
            }
        }
    }

    /// Double-click at `screen`: ask the host to edit an object's tag.
    pub fn on_double_click(&mut self, screen: Point) -> Vec<Action> {
        self.sync_with_store();
        let Some(id) = hit::point_hit(&self.store, &self.viewport, screen) else {
            return Vec::new();
        };
        match self.store.get(&id).and_then(Entity::as_object) {
            Some(obj) => vec![Action::EditTagRequested { id, tag: obj.tag.clone() }],
            None => Vec::new(),
        }
    }

    /// Wheel scrolled at `screen`: zoom about the cursor.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        let direction = if delta.dy < 0.0 {
            ZoomDirection::In
        } else if delta.dy > 0.0 {
            ZoomDirection::Out
        } else {
            return Vec::new();
        };
        self.viewport.zoom_at(screen, direction);
        vec![Action::RenderNeeded]
    }

    /// Key pressed.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.sync_with_store();
        if key.is_delete() {
            return self.delete_selection();
        }
        if key.is_escape() {
            self.input = InputState::Idle;
            let mut actions = Vec::new();
            if !self.ui.selection.is_empty() {
                self.ui.selection.clear();
                actions.push(Action::SelectionChanged);
            }
            actions.push(Action::RenderNeeded);
            return actions;
        }
        Vec::new()
    }

    // --- Gesture handlers ---

    fn on_select_down(&mut self, screen: Point) -> Vec<Action> {
        let hit = hit::point_hit(&self.store, &self.viewport, screen);
        match self.ui.selection.press(hit) {
            PressOutcome::Grabbed { newly_selected, .. } => {
                self.input = InputState::Dragging(DragSession::begin(&self.store, &self.ui.selection, screen));
                if newly_selected {
                    vec![Action::SelectionChanged, Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            PressOutcome::Empty { cleared } => {
                self.input = InputState::RubberBand(RubberBand::new(screen));
                if cleared {
                    vec![Action::SelectionChanged, Action::RenderNeeded]
                } else {
                    vec![Action::RenderNeeded]
                }
            }
        }
    }

    fn on_secondary_down(&mut self, screen: Point) -> Vec<Action> {
        if matches!(self.input, InputState::DrawingMarker { .. }) {
            self.input = InputState::Idle;
            debug!("marker draw cancelled");
            return vec![Action::RenderNeeded];
        }
        let hit = hit::point_hit(&self.store, &self.viewport, screen);
        match self.ui.selection.secondary_press(hit) {
            SecondaryOutcome::Cleared => {
                self.input = InputState::Idle;
                vec![Action::SelectionChanged, Action::RenderNeeded]
            }
            SecondaryOutcome::ContextMenu(id) => vec![Action::ContextMenuRequested { id, screen }],
            SecondaryOutcome::Missed if !self.ui.tool.is_select() => {
                self.set_tool(Tool::Select);
                vec![Action::ToolChanged, Action::RenderNeeded]
            }
            SecondaryOutcome::Missed => Vec::new(),
        }
    }

    fn place_at(&mut self, screen: Point, spec: &ObjectSpec) -> Vec<Action> {
        let center = self.viewport.screen_to_cell(screen);
        let selected = self.ui.selection.len();
        match self.place_object(center, spec) {
            Ok(id) => {
                let mut actions = vec![Action::ObjectCreated(id)];
                if self.ui.selection.len() != selected {
                    actions.push(Action::SelectionChanged);
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            Err(PlaceError::InvalidCoordinate { x, y }) => {
                trace!(x, y, "placement off the board dropped");
                Vec::new()
            }
            Err(err) => {
                info!(x = center.x, y = center.y, %err, "placement refused");
                vec![Action::PlacementRefused(err)]
            }
        }
    }

    fn paint_at(&mut self, screen: Point, terrain: TerrainType) -> Vec<Action> {
        let cell = self.viewport.screen_to_cell(screen);
        match self.paint_terrain(cell, terrain) {
            Ok(()) => vec![Action::TerrainPainted(cell), Action::RenderNeeded],
            Err(err) => {
                trace!(%err, "terrain paint dropped");
                Vec::new()
            }
        }
    }

    fn delete_at(&mut self, screen: Point) -> Vec<Action> {
        let Some(id) = hit::point_hit(&self.store, &self.viewport, screen) else {
            trace!(x = screen.x, y = screen.y, "delete press hit nothing");
            return Vec::new();
        };
        let was_selected = self.ui.selection.contains(&id);
        self.remove_entity(id);
        let mut actions = vec![Action::EntityDeleted(id)];
        if was_selected {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_marker(&mut self, screen: Point, color: String) -> Vec<Action> {
        if self.viewport.cell_at(screen).is_none() {
            trace!(x = screen.x, y = screen.y, "marker press off the board dropped");
            return Vec::new();
        }
        let anchor = self.viewport.snap_to_corner(screen);
        self.input = InputState::DrawingMarker { anchor, current: anchor, color };
        vec![Action::RenderNeeded]
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        if matches!(self.input, InputState::Dragging(_)) {
            self.input = InputState::Idle;
        }
        let removed = self.ui.selection.delete_from(&mut self.store);
        debug!(count = removed.len(), "selection deleted");
        let mut actions: Vec<Action> = removed.into_iter().map(Action::EntityDeleted).collect();
        actions.push(Action::SelectionChanged);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// Currently selected entities.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.ui.selection
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    /// The in-bounds cell under the pointer, or `None` when the pointer is
    /// off the board or has not been seen yet.
    #[must_use]
    pub fn hover_cell(&self) -> Option<GridCoord> {
        self.ui.hover.and_then(|p| self.viewport.cell_at(p))
    }

    /// Footprint the place tool would stamp under the pointer.
    #[must_use]
    pub fn placement_preview(&self) -> Option<PlacementPreview> {
        let Tool::PlaceObject(spec) = &self.ui.tool else {
            return None;
        };
        let center = self.hover_cell()?;
        let footprint = Footprint::of(center, spec.size);
        let replaced = |id: EntityId| {
            spec.unique && self.store.get(&id).and_then(Entity::as_object).is_some_and(|obj| obj.tag == spec.tag)
        };
        let blocked = self.store.first_overlap(&footprint, replaced).is_some();
        Some(PlacementPreview { center, footprint, blocked })
    }

    /// Grid box of the marker being drawn.
    #[must_use]
    pub fn marker_preview(&self) -> Option<Bbox> {
        self.input.marker_preview()
    }

    /// Grid box of the rubber band being dragged.
    #[must_use]
    pub fn rubber_band(&self) -> Option<Bbox> {
        match &self.input {
            InputState::RubberBand(band) => Some(band.grid_rect(&self.viewport)),
            _ => None,
        }
    }
}

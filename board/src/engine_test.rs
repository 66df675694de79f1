#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::Size;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn at(x: i32, y: i32) -> GridCoord {
    GridCoord::new(x, y)
}

fn spec(tag: &str) -> ObjectSpec {
    ObjectSpec::new(tag, "#FF5733")
}

/// Screen point at the middle of `(x, y)` under the engine's viewport.
fn cell_screen(engine: &Engine, x: i32, y: i32) -> Point {
    engine.viewport.cell_center_to_screen(at(x, y))
}

/// Screen point at a fractional grid position.
fn grid_screen(engine: &Engine, x: f64, y: f64) -> Point {
    engine.viewport.grid_to_screen(pt(x, y))
}

fn center_of(engine: &Engine, id: EntityId) -> GridCoord {
    engine.entity(&id).and_then(Entity::as_object).unwrap().center
}

fn click(engine: &mut Engine, screen: Point) -> Vec<Action> {
    let mut actions = engine.on_pointer_down(screen, Button::Primary);
    actions.extend(engine.on_pointer_up(screen, Button::Primary));
    actions
}

fn selected(engine: &Engine) -> Vec<EntityId> {
    engine.selection().iter().collect()
}

fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.sort_unstable();
    ids
}

// =============================================================
// Construction / tools
// =============================================================

#[test]
fn new_engine_is_idle_and_empty() {
    let engine = Engine::new();
    assert!(engine.store.is_empty());
    assert!(engine.input.is_idle());
    assert_eq!(engine.ui.tool, Tool::Select);
    assert_eq!(engine.viewport(), Viewport::default());
}

#[test]
fn with_viewport_keeps_viewport() {
    let vp = Viewport { pan_x: 3.0, pan_y: 4.0, zoom: 2.0 };
    assert_eq!(Engine::with_viewport(vp).viewport(), vp);
}

#[test]
fn set_tool_abandons_gesture() {
    let mut engine = Engine::new();
    engine.on_pointer_down(pt(100.0, 100.0), Button::Middle);
    engine.set_tool(Tool::Delete);
    assert!(engine.input.is_idle());
    assert_eq!(engine.ui.tool, Tool::Delete);
}

// =============================================================
// Place tool
// =============================================================

#[test]
fn place_tool_creates_object_under_pointer() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::PlaceObject(spec("MG")));
    let screen = cell_screen(&engine, 500, 500);
    let actions = engine.on_pointer_down(screen, Button::Primary);
    let [Action::ObjectCreated(id), Action::RenderNeeded] = actions.as_slice() else {
        panic!("unexpected actions: {actions:?}");
    };
    assert_eq!(center_of(&engine, *id), at(500, 500));
    assert!(matches!(engine.ui.tool, Tool::PlaceObject(_)));
}

#[test]
fn second_placement_at_same_cell_is_refused() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::PlaceObject(spec("MG")));
    let screen = cell_screen(&engine, 500, 500);
    engine.on_pointer_down(screen, Button::Primary);
    let actions = engine.on_pointer_down(screen, Button::Primary);
    assert!(matches!(actions.as_slice(), [Action::PlacementRefused(PlaceError::Occupied { x: 500, y: 500, .. })]));
    assert_eq!(engine.store.len(), 1);
}

#[test]
fn placement_off_the_board_is_silently_dropped() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::PlaceObject(spec("MG")));
    let actions = engine.on_pointer_down(pt(-5.0, -5.0), Button::Primary);
    assert!(actions.is_empty());
    assert!(engine.store.is_empty());
}

#[test]
fn unique_placement_drops_replaced_instance_from_selection() {
    let mut engine = Engine::new();
    let alice = spec("Alice").unique();
    let old = engine.place_object(at(100, 100), &alice).unwrap();
    engine.ui.selection.select_only(old);
    engine.set_tool(Tool::PlaceObject(alice));
    let screen = cell_screen(&engine, 300, 300);
    let actions = engine.on_pointer_down(screen, Button::Primary);
    assert!(actions.contains(&Action::SelectionChanged));
    assert!(engine.selection().is_empty());
    assert!(engine.entity(&old).is_none());
}

#[test]
fn hover_with_place_tool_requests_render() {
    let mut engine = Engine::new();
    assert!(engine.on_pointer_move(pt(10.0, 10.0)).is_empty());
    engine.set_tool(Tool::PlaceObject(spec("MG")));
    assert_eq!(engine.on_pointer_move(pt(20.0, 20.0)), vec![Action::RenderNeeded]);
}

#[test]
fn placement_preview_follows_hover() {
    let mut engine = Engine::new();
    assert_eq!(engine.placement_preview(), None);
    engine.set_tool(Tool::PlaceObject(spec("MG").with_size(Size::new(5, 3))));
    let screen = cell_screen(&engine, 200, 200);
    engine.on_pointer_move(screen);
    let preview = engine.placement_preview().unwrap();
    assert_eq!(preview.center, at(200, 200));
    assert_eq!(preview.footprint, Footprint { x0: 198, y0: 199, x1: 203, y1: 202 });
    assert!(!preview.blocked);

    engine.place_object(at(203, 200), &spec("rock")).unwrap();
    assert!(engine.placement_preview().unwrap().blocked);
}

#[test]
fn placement_preview_ignores_replaced_unique_instance() {
    let mut engine = Engine::new();
    let alice = spec("Alice").unique();
    engine.place_object(at(200, 200), &alice).unwrap();
    engine.set_tool(Tool::PlaceObject(alice));
    engine.on_pointer_move(cell_screen(&engine, 201, 200));
    assert!(!engine.placement_preview().unwrap().blocked);
}

// =============================================================
// Terrain / delete tools
// =============================================================

#[test]
fn paint_tool_paints_cell() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::PaintTerrain(TerrainType::DarkMud));
    let screen = cell_screen(&engine, 42, 7);
    assert_eq!(
        engine.on_pointer_down(screen, Button::Primary),
        vec![Action::TerrainPainted(at(42, 7)), Action::RenderNeeded]
    );
    assert_eq!(engine.store.terrain_at(at(42, 7)), Some(TerrainType::DarkMud));
}

#[test]
fn paint_off_the_board_is_silently_dropped() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::PaintTerrain(TerrainType::Mud));
    assert!(engine.on_pointer_down(pt(20_000.0, 10.0), Button::Primary).is_empty());
    assert_eq!(engine.store.terrain_len(), 0);
}

#[test]
fn delete_tool_removes_entity_and_prunes_selection() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("MG")).unwrap();
    engine.ui.selection.select_only(id);
    engine.set_tool(Tool::Delete);
    let actions = engine.on_pointer_down(cell_screen(&engine, 501, 501), Button::Primary);
    assert_eq!(actions, vec![Action::EntityDeleted(id), Action::SelectionChanged, Action::RenderNeeded]);
    assert!(engine.store.is_empty());
    assert!(engine.selection().is_empty());
}

#[test]
fn delete_tool_hits_the_pixel_an_object_was_placed_from() {
    let mut engine = Engine::new();
    let press = pt(50.0, 5000.0);
    engine.set_tool(Tool::PlaceObject(spec("R1").with_size(Size::new(1, 1))));
    let placed = engine.on_pointer_down(press, Button::Primary);
    let id = engine.store.object_at_center(at(5, 498)).unwrap();
    assert!(placed.contains(&Action::ObjectCreated(id)));

    engine.set_tool(Tool::Delete);
    assert!(engine.on_pointer_down(pt(50.0, 5010.0), Button::Primary).is_empty());
    let actions = engine.on_pointer_down(press, Button::Primary);
    assert!(actions.contains(&Action::EntityDeleted(id)));
    assert!(engine.store.is_empty());
}

#[test]
fn delete_tool_on_empty_space_does_nothing() {
    let mut engine = Engine::new();
    engine.place_object(at(500, 500), &spec("MG")).unwrap();
    engine.set_tool(Tool::Delete);
    assert!(engine.on_pointer_down(cell_screen(&engine, 10, 10), Button::Primary).is_empty());
    assert_eq!(engine.store.len(), 1);
}

// =============================================================
// Select tool: click and drag
// =============================================================

#[test]
fn press_on_object_selects_it() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("MG")).unwrap();
    let actions = engine.on_pointer_down(cell_screen(&engine, 500, 500), Button::Primary);
    assert_eq!(actions, vec![Action::SelectionChanged, Action::RenderNeeded]);
    assert_eq!(selected(&engine), vec![id]);
    assert!(matches!(engine.input, InputState::Dragging(_)));
}

#[test]
fn press_on_selected_object_keeps_multi_selection() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    let b = engine.place_object(at(600, 600), &spec("b")).unwrap();
    engine.ui.selection.replace([a, b]);
    let actions = engine.on_pointer_down(cell_screen(&engine, 600, 600), Button::Primary);
    assert!(actions.is_empty());
    assert_eq!(sorted(selected(&engine)), sorted(vec![a, b]));
}

#[test]
fn drag_twenty_right_ten_down_moves_plus_two_minus_one() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("MG")).unwrap();
    let press = cell_screen(&engine, 500, 500);
    engine.on_pointer_down(press, Button::Primary);
    let actions = engine.on_pointer_move(pt(press.x + 20.0, press.y + 10.0));
    assert_eq!(actions, vec![Action::EntitiesMoved(vec![id]), Action::RenderNeeded]);
    assert_eq!(center_of(&engine, id), at(502, 499));

    assert!(engine.on_pointer_up(pt(press.x + 20.0, press.y + 10.0), Button::Primary).is_empty());
    assert!(engine.input.is_idle());
    assert_eq!(selected(&engine), vec![id]);
}

#[test]
fn drag_is_blocked_by_other_object() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    engine.place_object(at(505, 500), &spec("b")).unwrap();
    let press = cell_screen(&engine, 500, 500);
    engine.on_pointer_down(press, Button::Primary);
    assert!(engine.on_pointer_move(pt(press.x + 30.0, press.y)).is_empty());
    assert_eq!(center_of(&engine, a), at(500, 500));
}

#[test]
fn drag_moves_whole_selection() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    let m = engine.upsert_marker("zone", Bbox::new(400.0, 400.0, 410.0, 410.0), "#00f");
    engine.ui.selection.replace([a, m]);
    let press = cell_screen(&engine, 500, 500);
    engine.on_pointer_down(press, Button::Primary);
    engine.on_pointer_move(pt(press.x - 10.0, press.y - 30.0));
    assert_eq!(center_of(&engine, a), at(499, 503));
    assert_eq!(engine.entity(&m).unwrap().bbox(), Bbox::new(399.0, 403.0, 409.0, 413.0));
}

// =============================================================
// Select tool: rubber band
// =============================================================

#[test]
fn rubber_band_selects_fully_contained_entities() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(10, 10), &spec("A")).unwrap();
    let b = engine.place_object(at(20, 20), &spec("B")).unwrap();
    let c = engine.place_object(at(24, 15), &spec("C")).unwrap();
    engine.ui.selection.select_only(c);

    let start = grid_screen(&engine, 5.0, 25.0);
    let end = grid_screen(&engine, 25.0, 5.0);
    let down = engine.on_pointer_down(start, Button::Primary);
    assert_eq!(down, vec![Action::SelectionChanged, Action::RenderNeeded]);
    assert!(engine.selection().is_empty());

    engine.on_pointer_move(end);
    assert_eq!(engine.rubber_band(), Some(Bbox::new(5.0, 5.0, 25.0, 25.0)));

    let up = engine.on_pointer_up(end, Button::Primary);
    assert_eq!(up, vec![Action::SelectionChanged, Action::RenderNeeded]);
    assert_eq!(sorted(selected(&engine)), sorted(vec![a, b]));
    assert_eq!(engine.rubber_band(), None);
}

#[test]
fn empty_rubber_band_clears_selection() {
    let mut engine = Engine::new();
    engine.place_object(at(500, 500), &spec("a")).unwrap();
    let p = grid_screen(&engine, 100.0, 100.0);
    click(&mut engine, p);
    assert!(engine.selection().is_empty());
}

// =============================================================
// Right click
// =============================================================

#[test]
fn right_click_with_selection_clears_without_menu() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("a")).unwrap();
    let screen = cell_screen(&engine, 500, 500);
    click(&mut engine, screen);
    assert_eq!(selected(&engine), vec![id]);

    let actions = engine.on_pointer_down(screen, Button::Secondary);
    assert_eq!(actions, vec![Action::SelectionChanged, Action::RenderNeeded]);
    assert!(engine.selection().is_empty());
}

#[test]
fn right_click_on_entity_without_selection_requests_menu() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("a")).unwrap();
    let screen = cell_screen(&engine, 500, 500);
    assert_eq!(engine.on_pointer_down(screen, Button::Secondary), vec![Action::ContextMenuRequested { id, screen }]);
}

#[test]
fn right_click_on_empty_space_resets_tool() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::PaintTerrain(TerrainType::Mud));
    let actions = engine.on_pointer_down(pt(50.0, 50.0), Button::Secondary);
    assert_eq!(actions, vec![Action::ToolChanged, Action::RenderNeeded]);
    assert_eq!(engine.ui.tool, Tool::Select);
    assert!(engine.on_pointer_down(pt(50.0, 50.0), Button::Secondary).is_empty());
}

// =============================================================
// Marker draw
// =============================================================

#[test]
fn marker_draw_commits_named_marker() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::DrawMarker { color: "#00f".into() });
    let start = grid_screen(&engine, 100.2, 199.8);
    let end = grid_screen(&engine, 109.7, 195.1);

    assert_eq!(engine.on_pointer_down(start, Button::Primary), vec![Action::RenderNeeded]);
    engine.on_pointer_move(end);
    assert_eq!(engine.marker_preview(), Some(Bbox::new(100.0, 195.0, 110.0, 200.0)));

    let actions = engine.on_pointer_up(end, Button::Primary);
    let [Action::MarkerCreated(id), Action::RenderNeeded] = actions.as_slice() else {
        panic!("unexpected actions: {actions:?}");
    };
    let marker = engine.entity(id).and_then(Entity::as_marker).unwrap();
    assert_eq!(marker.name, "marker-1");
    assert_eq!(marker.bbox, Bbox::new(100.0, 195.0, 110.0, 200.0));
    assert_eq!(marker.color, "#00f");
    assert_eq!(engine.store.objects().count(), 0);
}

#[test]
fn marker_draw_names_are_sequential() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::DrawMarker { color: "#00f".into() });
    for offset in [0.0, 20.0] {
        let start = grid_screen(&engine, 100.0 + offset, 100.0);
        let end = grid_screen(&engine, 105.0 + offset, 95.0);
        engine.on_pointer_down(start, Button::Primary);
        engine.on_pointer_up(end, Button::Primary);
    }
    assert!(engine.store.marker_by_name("marker-1").is_some());
    assert!(engine.store.marker_by_name("marker-2").is_some());
}

#[test]
fn marker_draw_right_click_cancels() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::DrawMarker { color: "#00f".into() });
    let start = grid_screen(&engine, 100.0, 100.0);
    let end = grid_screen(&engine, 110.0, 90.0);
    engine.on_pointer_down(start, Button::Primary);
    engine.on_pointer_move(end);
    assert_eq!(engine.on_pointer_down(end, Button::Secondary), vec![Action::RenderNeeded]);
    assert!(engine.on_pointer_up(end, Button::Primary).is_empty());
    assert!(engine.store.is_empty());
    assert!(matches!(engine.ui.tool, Tool::DrawMarker { .. }));
}

#[test]
fn marker_draw_without_area_is_discarded() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::DrawMarker { color: "#00f".into() });
    let p = grid_screen(&engine, 100.0, 100.0);
    assert_eq!(click(&mut engine, p), vec![Action::RenderNeeded, Action::RenderNeeded]);
    assert!(engine.store.is_empty());
}

#[test]
fn marker_draw_press_off_the_board_is_dropped() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::DrawMarker { color: "#00f".into() });
    assert!(engine.on_pointer_down(pt(-50.0, -50.0), Button::Primary).is_empty());
    assert!(engine.input.is_idle());
}

// =============================================================
// Pan / zoom
// =============================================================

#[test]
fn middle_drag_pans_under_any_tool() {
    let mut engine = Engine::new();
    engine.set_tool(Tool::Delete);
    engine.on_pointer_down(pt(100.0, 100.0), Button::Middle);
    assert_eq!(engine.on_pointer_move(pt(130.0, 90.0)), vec![Action::RenderNeeded]);
    engine.on_pointer_move(pt(140.0, 95.0));
    assert_eq!(engine.viewport().pan_x, 40.0);
    assert_eq!(engine.viewport().pan_y, -5.0);
    assert!(engine.on_pointer_up(pt(140.0, 95.0), Button::Middle).is_empty());
    assert!(engine.input.is_idle());
}

#[test]
fn wheel_up_zooms_in_about_cursor() {
    let mut engine = Engine::with_viewport(Viewport { pan_x: -4600.0, pan_y: -4600.0, zoom: 1.0 });
    let cursor = pt(333.0, 777.0);
    let before = engine.viewport.screen_to_grid(cursor);
    assert_eq!(engine.on_wheel(cursor, WheelDelta { dx: 0.0, dy: -120.0 }), vec![Action::RenderNeeded]);
    assert!((engine.viewport().zoom - 1.1).abs() < 1e-12);
    let after = engine.viewport.screen_to_grid(cursor);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn wheel_down_zooms_out() {
    let mut engine = Engine::new();
    engine.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: 3.0 });
    assert!((engine.viewport().zoom - 0.9).abs() < 1e-12);
}

#[test]
fn horizontal_wheel_is_ignored() {
    let mut engine = Engine::new();
    assert!(engine.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 5.0, dy: 0.0 }).is_empty());
    assert_eq!(engine.viewport(), Viewport::default());
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn delete_key_removes_selection() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(10, 10), &spec("a")).unwrap();
    let m = engine.upsert_marker("m", Bbox::new(0.0, 0.0, 2.0, 2.0), "#000");
    let keep = engine.place_object(at(50, 50), &spec("keep")).unwrap();
    engine.ui.selection.replace([a, m]);

    let actions = engine.on_key_down(&Key("Delete".into()));
    assert_eq!(actions.len(), 4);
    assert!(actions.contains(&Action::EntityDeleted(a)));
    assert!(actions.contains(&Action::EntityDeleted(m)));
    assert!(engine.selection().is_empty());
    assert_eq!(engine.store.len(), 1);
    assert!(engine.entity(&keep).is_some());
}

#[test]
fn delete_key_with_empty_selection_is_noop() {
    let mut engine = Engine::new();
    engine.place_object(at(10, 10), &spec("a")).unwrap();
    assert!(engine.on_key_down(&Key("Backspace".into())).is_empty());
    assert_eq!(engine.store.len(), 1);
}

#[test]
fn escape_cancels_rubber_band_and_clears_selection() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("a")).unwrap();
    engine.ui.selection.select_only(id);
    engine.input = InputState::RubberBand(RubberBand::new(pt(0.0, 0.0)));
    let actions = engine.on_key_down(&Key("Escape".into()));
    assert_eq!(actions, vec![Action::SelectionChanged, Action::RenderNeeded]);
    assert!(engine.input.is_idle());
    assert!(engine.selection().is_empty());
}

#[test]
fn other_keys_are_ignored() {
    let mut engine = Engine::new();
    assert!(engine.on_key_down(&Key("a".into())).is_empty());
}

// =============================================================
// Direct edits
// =============================================================

#[test]
fn removing_selected_entity_prunes_selection() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(10, 10), &spec("a")).unwrap();
    let b = engine.place_object(at(20, 20), &spec("b")).unwrap();
    engine.ui.selection.replace([a, b]);
    assert!(engine.remove_entity(a));
    assert!(!engine.selection().contains(&a));
    assert!(engine.selection().contains(&b));
    assert!(!engine.remove_entity(a));
}

#[test]
fn removing_dragged_entity_ends_drag() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    engine.on_pointer_down(cell_screen(&engine, 500, 500), Button::Primary);
    engine.remove_entity(a);
    assert!(engine.input.is_idle());
}

#[test]
fn direct_store_removal_is_reconciled_on_next_key() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    let b = engine.place_object(at(510, 500), &spec("b")).unwrap();
    engine.ui.selection.replace([a, b]);
    engine.store.remove(a);

    let actions = engine.on_key_down(&Key("Delete".into()));
    assert!(!actions.contains(&Action::EntityDeleted(a)));
    assert!(actions.contains(&Action::EntityDeleted(b)));
    assert!(engine.selection().is_empty());
}

#[test]
fn direct_store_removal_ends_drag_on_next_move() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    engine.on_pointer_down(cell_screen(&engine, 500, 500), Button::Primary);
    engine.store.remove(a);
    assert!(engine.on_pointer_move(cell_screen(&engine, 503, 500)).is_empty());
    assert!(engine.input.is_idle());
    assert!(engine.selection().is_empty());
}

#[test]
fn sync_with_store_reports_pruned_selection() {
    let mut engine = Engine::new();
    let a = engine.place_object(at(500, 500), &spec("a")).unwrap();
    engine.ui.selection.select_only(a);
    assert!(!engine.sync_with_store());
    engine.store.remove(a);
    assert!(engine.sync_with_store());
    assert!(engine.selection().is_empty());
}

#[test]
fn remove_marker_and_object_at_prune_selection() {
    let mut engine = Engine::new();
    let m = engine.upsert_marker("camp", Bbox::new(0.0, 0.0, 5.0, 5.0), "#000");
    let o = engine.place_object(at(100, 100), &spec("o")).unwrap();
    engine.ui.selection.replace([m, o]);
    assert_eq!(engine.remove_marker("camp"), Some(m));
    assert_eq!(engine.remove_object_at(at(100, 100)), Some(o));
    assert!(engine.selection().is_empty());
    assert_eq!(engine.remove_marker("camp"), None);
}

#[test]
fn double_click_on_object_requests_tag_edit() {
    let mut engine = Engine::new();
    let id = engine.place_object(at(500, 500), &spec("old")).unwrap();
    let actions = engine.on_double_click(cell_screen(&engine, 500, 500));
    assert_eq!(actions, vec![Action::EditTagRequested { id, tag: "old".into() }]);
    engine.set_tag(id, "new").unwrap();
    assert_eq!(engine.entity(&id).and_then(Entity::as_object).unwrap().tag, "new");
}

#[test]
fn double_click_on_marker_or_empty_is_ignored() {
    let mut engine = Engine::new();
    engine.upsert_marker("m", Bbox::new(0.0, 0.0, 50.0, 50.0), "#000");
    assert!(engine.on_double_click(grid_screen(&engine, 10.0, 10.0)).is_empty());
    assert!(engine.on_double_click(grid_screen(&engine, 500.0, 500.0)).is_empty());
}

#[test]
fn paint_terrain_rejects_off_board() {
    let mut engine = Engine::new();
    assert!(engine.paint_terrain(at(-1, 0), TerrainType::Mud).is_err());
    assert!(engine.paint_terrain(at(0, 0), TerrainType::Mud).is_ok());
}

// =============================================================
// Queries
// =============================================================

#[test]
fn hover_cell_tracks_pointer() {
    let mut engine = Engine::new();
    assert_eq!(engine.hover_cell(), None);
    engine.on_pointer_move(cell_screen(&engine, 321, 654));
    assert_eq!(engine.hover_cell(), Some(at(321, 654)));
    engine.on_pointer_move(pt(-1.0, -1.0));
    assert_eq!(engine.hover_cell(), None);
}

// =============================================================
// Snapshot
// =============================================================

#[test]
fn snapshot_restore_round_trip() {
    let mut engine = Engine::with_viewport(Viewport { pan_x: -120.5, pan_y: 33.0, zoom: 1.25 });
    let o = engine.place_object(at(500, 500), &spec("MG").with_avatar("mg.png")).unwrap();
    engine.upsert_marker("camp", Bbox::new(1.5, 2.0, 8.25, 9.0), "#0f0");
    engine.paint_terrain(at(3, 4), TerrainType::Mud).unwrap();
    engine.ui.selection.select_only(o);

    let text = serde_json::to_string(&engine.snapshot()).unwrap();
    let mut restored = Engine::new();
    let issues = restored.restore(codec::decode(&text, Viewport::default()));
    assert!(issues.is_empty());
    assert_eq!(restored.viewport(), engine.viewport());
    assert_eq!(restored.snapshot(), engine.snapshot());
    assert!(restored.selection().is_empty());
}

#[test]
fn restore_drops_gesture_in_progress() {
    let mut engine = Engine::new();
    engine.on_pointer_down(pt(0.0, 0.0), Button::Middle);
    engine.restore(codec::decode("{}", Viewport::default()));
    assert!(engine.input.is_idle());
}

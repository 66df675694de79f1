//! Spatial engine for the planning board.
//!
//! The board is a fixed square grid onto which operators place tagged
//! objects, paint terrain and draw named markers, then pan and zoom a
//! viewport over it. This crate owns everything with geometry in it:
//! translating raw pointer input into board mutations, keeping objects from
//! overlapping, hit-testing, selection, drag, and snapshot encoding. The host
//! process is responsible only for wiring window events to the
//! [`engine::Engine`], drawing the [`scene::Scene`] it describes, and
//! check-pointing snapshots to disk.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine, input dispatch and [`engine::Action`]s |
//! | [`doc`] | Entity arena, terrain layer and placement rules |
//! | [`index`] | Bucket spatial index over entity bounding boxes |
//! | [`camera`] | Pan/zoom viewport and pixel/grid conversions |
//! | [`input`] | Tools, input event types and the gesture state machine |
//! | [`hit`] | Point and rubber-band hit-testing |
//! | [`selection`] | Selection set and click/right-click rules |
//! | [`drag`] | Live drag of the selected entities |
//! | [`codec`] | Snapshot serialization with per-collection recovery |
//! | [`presets`] | Palettes, roster placement, custom kinds, preset terrain |
//! | [`scene`] | Screen-space display list for the renderer |
//! | [`consts`] | Board dimensions, zoom steps and grid thresholds |

pub mod camera;
pub mod codec;
pub mod consts;
pub mod doc;
pub mod drag;
pub mod engine;
pub mod hit;
pub mod index;
pub mod input;
pub mod presets;
pub mod scene;
pub mod selection;

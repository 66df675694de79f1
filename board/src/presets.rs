//! Built-in palettes, roster-member placement, custom object kinds and the
//! preset terrain regions painted on a fresh board.

#[cfg(test)]
#[path = "presets_test.rs"]
mod presets_test;

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::GridCoord;
use crate::doc::{EntityStore, ObjectSpec, Size, TerrainType};

/// One placeable entry of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub tag: &'static str,
    pub color: &'static str,
}

impl Swatch {
    /// A default-sized, non-unique spec for this swatch.
    #[must_use]
    pub fn spec(&self) -> ObjectSpec {
        ObjectSpec::new(self.tag, self.color)
    }
}

/// A named group of swatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub swatches: &'static [Swatch],
}

impl Palette {
    #[must_use]
    pub fn swatch(&self, tag: &str) -> Option<Swatch> {
        self.swatches.iter().copied().find(|s| s.tag == tag)
    }
}

const fn swatch(tag: &'static str, color: &'static str) -> Swatch {
    Swatch { tag, color }
}

pub const ALLIANCE: Palette = Palette {
    name: "Alliance",
    swatches: &[
        swatch("R1", "#2C3E50"),
        swatch("R2", "#34495E"),
        swatch("R3", "#5D6D7E"),
        swatch("R4", "#2874A6"),
        swatch("R5", "#1F618D"),
    ],
};

pub const FRIENDLY: Palette = Palette {
    name: "Friendly",
    swatches: &[
        swatch("1", "#145A32"),
        swatch("2", "#1E8449"),
        swatch("3", "#28B463"),
        swatch("4", "#52BE80"),
        swatch("5", "#82E0AA"),
    ],
};

pub const ENEMY: Palette = Palette {
    name: "Enemy",
    swatches: &[
        swatch("1", "#922B21"),
        swatch("2", "#A93226"),
        swatch("3", "#C0392B"),
        swatch("4", "#E74C3C"),
        swatch("5", "#F1948A"),
    ],
};

pub const OTHER: Palette = Palette { name: "Other", swatches: &[swatch("MG", "#FF5733")] };

/// Every built-in palette, in menu order.
pub const PALETTES: [Palette; 4] = [ALLIANCE, FRIENDLY, ENEMY, OTHER];

/// Color used for unknown ranks.
pub const UNRANKED_COLOR: &str = "#000000";

/// Default color for a roster rank (`"R1"`..`"R5"`).
#[must_use]
pub fn rank_color(rank: &str) -> &'static str {
    ALLIANCE.swatch(rank).map_or(UNRANKED_COLOR, |s| s.color)
}

// =============================================================
// Roster
// =============================================================

fn unnamed() -> String {
    "Unnamed".to_owned()
}

fn first_rank() -> String {
    "R1".to_owned()
}

/// A roster record as kept by the member-management collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    #[serde(rename = "Name", default = "unnamed")]
    pub name: String,
    #[serde(rename = "Rank", default = "first_rank")]
    pub rank: String,
    /// Opaque image handle; the engine only passes it through.
    #[serde(rename = "Avatar", default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "Size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<[i32; 2]>,
}

impl RosterMember {
    /// Spec that places this member's icon. Unique per name, so placing it
    /// again moves the member rather than duplicating them.
    #[must_use]
    pub fn object_spec(&self) -> ObjectSpec {
        let size = self.size.map_or_else(Size::default, |[w, h]| Size::new(w, h));
        let mut spec = ObjectSpec::new(self.name.clone(), rank_color(&self.rank)).with_size(size).unique();
        spec.avatar.clone_from(&self.avatar);
        spec
    }
}

/// Parse a roster list (`[{"Name", "Rank", "Avatar"}, ...]`).
///
/// # Errors
///
/// Returns the `serde_json` error when the text is not a list of records.
pub fn parse_roster(text: &str) -> Result<Vec<RosterMember>, serde_json::Error> {
    serde_json::from_str(text)
}

// =============================================================
// Custom objects
// =============================================================

/// Operator-defined object kinds, keyed by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomObjects {
    kinds: BTreeMap<String, (String, Size)>,
}

impl CustomObjects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine `tag`.
    pub fn define(&mut self, tag: impl Into<String>, color: impl Into<String>, size: Size) {
        let tag = tag.into();
        debug!(%tag, w = size.w, h = size.h, "custom object defined");
        self.kinds.insert(tag, (color.into(), size));
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.kinds.remove(tag).is_some()
    }

    /// Placement spec for `tag`.
    #[must_use]
    pub fn spec(&self, tag: &str) -> Option<ObjectSpec> {
        self.kinds.get(tag).map(|(color, size)| ObjectSpec::new(tag, color.clone()).with_size(*size))
    }

    /// Defined tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.kinds.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Parse a `"w,h"` size as typed in a dialog. Anything unreadable is the default size.
#[must_use]
pub fn parse_size(text: &str) -> Size {
    let parsed = text.split_once(',').map(|(w, h)| (w.trim().parse::<i32>(), h.trim().parse::<i32>()));
    match parsed {
        Some((Ok(w), Ok(h))) => Size::new(w, h),
        _ => Size::default(),
    }
}

// =============================================================
// Preset terrain
// =============================================================

/// A rectangular block of cells, half-open on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRegion {
    pub xs: Range<i32>,
    pub ys: Range<i32>,
}

impl CellRegion {
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.xs.clone().flat_map(move |x| self.ys.clone().map(move |y| GridCoord::new(x, y)))
    }
}

/// The contested mud area.
pub const MUD_REGION: CellRegion = CellRegion { xs: 448..552, ys: 446..550 };

/// The restricted dark-mud area, painted over the middle of the mud.
pub const DARK_MUD_REGION: CellRegion = CellRegion { xs: 489..510, ys: 486..508 };

/// Paint the preset regions. Dark mud is painted last and wins where they
/// overlap. Returns the number of cells written.
pub fn paint_preset_terrain(store: &mut EntityStore) -> usize {
    let layers = [(MUD_REGION, TerrainType::Mud), (DARK_MUD_REGION, TerrainType::DarkMud)];
    let mut painted = 0;
    for (region, terrain) in &layers {
        for cell in region.cells() {
            if store.set_terrain(cell, *terrain).is_ok() {
                painted += 1;
            }
        }
    }
    debug!(painted, "preset terrain painted");
    painted
}

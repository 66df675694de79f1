//! Selection set and the click / rubber-band / right-click rules that edit it.
//!
//! The set only ever holds ids that exist in the store: every removal path in
//! [`crate::engine::Engine`] prunes it, and [`Selection::retain_existing`]
//! re-establishes the invariant after bulk changes such as a snapshot load.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::BTreeSet;

use crate::camera::{Point, Viewport};
use crate::doc::{Bbox, EntityId, EntityStore};

/// Result of a primary press under the select tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// The press landed on an entity, which is now part of the selection.
    Grabbed {
        id: EntityId,
        /// `true` when the press replaced the previous selection.
        newly_selected: bool,
    },
    /// The press landed on empty space; the selection was cleared.
    Empty {
        /// `true` when something was selected before the press.
        cleared: bool,
    },
}

/// Result of a secondary (right) press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryOutcome {
    /// A non-empty selection was cleared; the press is consumed.
    Cleared,
    /// Nothing was selected and the press landed on an entity.
    ContextMenu(EntityId),
    /// Nothing was selected and the press landed on empty space.
    Missed,
}

/// The set of selected objects and markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<EntityId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }

    /// Replace the selection with exactly `id`.
    pub fn select_only(&mut self, id: EntityId) {
        self.ids.clear();
        self.ids.insert(id);
    }

    /// Replace the selection with `ids`.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop `id` from the selection. Returns whether it was selected.
    pub fn remove(&mut self, id: &EntityId) -> bool {
        self.ids.remove(id)
    }

    /// Drop every id the store no longer holds.
    pub fn retain_existing(&mut self, store: &EntityStore) {
        self.ids.retain(|id| store.contains(id));
    }

    /// Apply a primary press that hit `hit` (or nothing).
    pub fn press(&mut self, hit: Option<EntityId>) -> PressOutcome {
        match hit {
            Some(id) if self.contains(&id) => PressOutcome::Grabbed { id, newly_selected: false },
            Some(id) => {
                self.select_only(id);
                PressOutcome::Grabbed { id, newly_selected: true }
            }
            None => {
                let cleared = !self.is_empty();
                self.clear();
                PressOutcome::Empty { cleared }
            }
        }
    }

    /// Apply a secondary press that hit `hit` (or nothing).
    pub fn secondary_press(&mut self, hit: Option<EntityId>) -> SecondaryOutcome {
        if !self.is_empty() {
            self.clear();
            return SecondaryOutcome::Cleared;
        }
        match hit {
            Some(id) => SecondaryOutcome::ContextMenu(id),
            None => SecondaryOutcome::Missed,
        }
    }

    /// Remove every selected entity from `store` and clear the selection.
    /// Returns the ids actually removed.
    pub fn delete_from(&mut self, store: &mut EntityStore) -> Vec<EntityId> {
        let removed = self.ids.iter().filter_map(|id| store.remove(*id).map(|e| e.id)).collect();
        self.ids.clear();
        removed
    }
}

/// A rubber-band rectangle being dragged out in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBand {
    /// Screen point where the band was started.
    pub start: Point,
    /// Screen point of the latest motion event.
    pub current: Point,
}

impl RubberBand {
    #[must_use]
    pub fn new(start: Point) -> Self {
        Self { start, current: start }
    }

    /// The band as a normalized box in grid space.
    #[must_use]
    pub fn grid_rect(&self, viewport: &Viewport) -> Bbox {
        Bbox::from_corners(viewport.screen_to_grid(self.start), viewport.screen_to_grid(self.current))
    }
}

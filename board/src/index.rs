//! Uniform bucket grid over the board for hit-testing and collision queries.
//!
//! The board is divided into square buckets of [`BUCKET_CELLS`] cells. Each
//! entity is registered in every bucket its bounding box touches; lookups
//! return candidates that the caller must still test exactly. Bucket ranges
//! are clamped to the board on both insert and query, so entities dragged or
//! drawn partly off the board remain findable from the nearest edge bucket.

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

use std::collections::HashMap;

use crate::camera::Point;
use crate::consts::{BUCKET_CELLS, GRID_SIZE};
use crate::doc::{Bbox, EntityId};

/// Buckets along one axis.
#[allow(clippy::cast_sign_loss)]
const BUCKETS_PER_AXIS: usize = ((GRID_SIZE + BUCKET_CELLS - 1) / BUCKET_CELLS) as usize;

/// Inclusive bucket range covered by one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BucketSpan {
    bx0: usize,
    by0: usize,
    bx1: usize,
    by1: usize,
}

impl BucketSpan {
    fn of(bbox: &Bbox) -> Self {
        Self {
            bx0: bucket_of(bbox.x1),
            by0: bucket_of(bbox.y1),
            bx1: bucket_of(bbox.x2),
            by1: bucket_of(bbox.y2),
        }
    }

    fn cells(self) -> impl Iterator<Item = usize> {
        (self.by0..=self.by1).flat_map(move |by| (self.bx0..=self.bx1).map(move |bx| by * BUCKETS_PER_AXIS + bx))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bucket_of(v: f64) -> usize {
    let b = (v / f64::from(BUCKET_CELLS)).floor();
    if b.is_nan() || b <= 0.0 {
        0
    } else if b >= (BUCKETS_PER_AXIS - 1) as f64 {
        BUCKETS_PER_AXIS - 1
    } else {
        b as usize
    }
}

/// Spatial index mapping board regions to the entities that cover them.
pub struct SpatialIndex {
    buckets: Vec<Vec<EntityId>>,
    spans: HashMap<EntityId, BucketSpan>,
}

impl SpatialIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: (0..BUCKETS_PER_AXIS * BUCKETS_PER_AXIS).map(|_| Vec::new()).collect(),
            spans: HashMap::new(),
        }
    }

    /// Register `id` at `bbox`, replacing any previous registration.
    pub fn insert(&mut self, id: EntityId, bbox: &Bbox) {
        let span = BucketSpan::of(bbox);
        if let Some(old) = self.spans.get(&id).copied() {
            if old == span {
                return;
            }
            self.detach(id, old);
        }
        for cell in span.cells() {
            self.buckets[cell].push(id);
        }
        self.spans.insert(id, span);
    }

    /// Drop `id` from the index. Unknown ids are ignored.
    pub fn remove(&mut self, id: EntityId) {
        if let Some(span) = self.spans.remove(&id) {
            self.detach(id, span);
        }
    }

    fn detach(&mut self, id: EntityId, span: BucketSpan) {
        for cell in span.cells() {
            self.buckets[cell].retain(|e| *e != id);
        }
    }

    /// Entities whose registration covers the bucket containing `p` (grid space).
    #[must_use]
    pub fn query_point(&self, p: Point) -> &[EntityId] {
        let cell = bucket_of(p.y) * BUCKETS_PER_AXIS + bucket_of(p.x);
        &self.buckets[cell]
    }

    /// Entities whose registration touches any bucket overlapping `bbox`, deduplicated.
    #[must_use]
    pub fn query_rect(&self, bbox: &Bbox) -> Vec<EntityId> {
        let mut out: Vec<EntityId> = BucketSpan::of(bbox)
            .cells()
            .flat_map(|cell| self.buckets[cell].iter().copied())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Remove every registration.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.spans.clear();
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding-box grid index for footprint spatial joins.
//!
//! Uses a grid-based spatial hash: each footprint is registered in every cell
//! its bounding box touches. A query returns the candidates sharing a cell
//! with the query box; exact predicates are left to the caller. Footprints
//! spanning too many cells are kept in an overflow list that every query
//! returns.

use geo::Rect;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::footprint::Footprint;

/// Items whose bounding box covers more cells than this go to overflow.
const MAX_CELLS_PER_ITEM: i64 = 4096;

/// A spatial hash grid over footprint bounding boxes.
#[derive(Debug)]
pub struct FootprintIndex {
    cell_size: f64,
    grid: FxHashMap<(i64, i64), Vec<usize>>,
    overflow: Vec<usize>,
    len: usize,
}

impl FootprintIndex {
    /// Creates a new, empty index with the given cell size.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            grid: FxHashMap::default(),
            overflow: Vec::new(),
            len: 0,
        }
    }

    /// Builds an index over footprints; items are identified by position.
    pub fn build<'a>(
        footprints: impl IntoIterator<Item = &'a Footprint>,
        cell_size: f64,
    ) -> Self {
        let mut index = Self::new(cell_size);
        for (i, fp) in footprints.into_iter().enumerate() {
            if let Some(rect) = fp.bounding_rect() {
                index.insert(i, rect);
            }
        }
        index
    }

    pub fn insert(&mut self, item: usize, rect: Rect<f64>) {
        self.len += 1;
        let ((x0, y0), (x1, y1)) = self.cell_range(rect);
        if (x1 - x0 + 1) * (y1 - y0 + 1) > MAX_CELLS_PER_ITEM {
            self.overflow.push(item);
            return;
        }
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.grid.entry((cx, cy)).or_default().push(item);
            }
        }
    }

    /// Candidate items whose bounding box may touch `rect`, in ascending order.
    pub fn query(&self, rect: Rect<f64>) -> Vec<usize> {
        let mut found: FxHashSet<usize> = self.overflow.iter().copied().collect();
        let ((x0, y0), (x1, y1)) = self.cell_range(rect);
        if (x1 - x0 + 1) * (y1 - y0 + 1) > MAX_CELLS_PER_ITEM {
            for items in self.grid.values() {
                found.extend(items.iter().copied());
            }
        } else {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    if let Some(items) = self.grid.get(&(cx, cy)) {
                        found.extend(items.iter().copied());
                    }
                }
            }
        }
        let mut result: Vec<usize> = found.into_iter().collect();
        result.sort_unstable();
        result
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn cell_range(&self, rect: Rect<f64>) -> ((i64, i64), (i64, i64)) {
        (
            self.cell_coords(rect.min().x, rect.min().y),
            self.cell_coords(rect.max().x, rect.max().y),
        )
    }

    fn cell_coords(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }
}

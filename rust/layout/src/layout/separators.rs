// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Separator conflict resolution.

use floorplan_geometry::{bool2d, Footprint, MultiPolygon};
use geo::Area as _;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::Layout;
use crate::entity::Spatial;
use crate::error::Result;
use crate::separator::Separator;
use crate::types::FeatureType;

impl Layout {
    /// Separators with overlaps resolved, painter's style.
    ///
    /// Separators are ranked by width, then area, both descending (ties by
    /// id). Each one keeps only what higher-ranked separators have not
    /// claimed. A separator cut into several pieces yields `"{id}-{k}"`
    /// pieces; a piece inherits the openings that still overlap it, re-fitted
    /// to the piece.
    pub fn non_overlapping_separators(&self) -> Result<&[Separator]> {
        if let Some(pieces) = self.cache.non_overlapping.get() {
            return Ok(pieces);
        }
        self.ensure_absolute("separators")?;
        let eps = self.tolerances.overlap_area_epsilon;

        let mut ranked: Vec<&Separator> = self.separators().collect();
        ranked.sort_by(|a, b| {
            b.entity()
                .width()
                .total_cmp(&a.entity().width())
                .then_with(|| b.footprint().area().total_cmp(&a.footprint().area()))
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut claimed = MultiPolygon::new(Vec::new());
        let mut pieces = Vec::with_capacity(ranked.len());
        let mut trimmed = 0usize;
        for separator in ranked {
            let own = separator.footprint().to_multi();
            let mut remaining = bool2d::difference(&own, &claimed);
            remaining.0.retain(|p| p.unsigned_area() > eps);
            claimed = bool2d::union(&claimed, &own);
            if remaining.0.len() != 1 || remaining.unsigned_area() + eps < own.unsigned_area() {
                trimmed += 1;
            }

            let split = remaining.0.len() > 1;
            for (k, part) in remaining.0.into_iter().enumerate() {
                let id = if split {
                    format!("{}-{}", separator.id(), k)
                } else {
                    separator.id().to_string()
                };
                let mut piece = separator.split_off(id, Footprint::Polygon(part));
                for opening in separator.openings() {
                    if bool2d::overlap_area(opening.footprint(), piece.footprint()) > eps {
                        let adjusted = opening.adjusted_to(&piece)?;
                        piece.add_opening(adjusted);
                    }
                }
                pieces.push(piece);
            }
        }
        debug!(
            separators = self.separators.len(),
            pieces = pieces.len(),
            trimmed,
            "non-overlapping separators computed"
        );
        Ok(self.cache.non_overlapping.get_or_init(|| pieces))
    }

    /// Area of stairs not covered by separators.
    ///
    /// Only stairs of `selected_areas` count when given.
    pub fn stair_area_no_overlap(&self, selected_areas: Option<&[&str]>) -> f64 {
        let selected: Option<FxHashSet<&str>> = selected_areas.map(|ids| ids.iter().copied().collect());
        let stairs = bool2d::union_all(
            self.areas()
                .filter(|a| selected.as_ref().map_or(true, |s| s.contains(a.id())))
                .flat_map(|a| a.features())
                .filter(|f| f.feature_type() == FeatureType::Stairs)
                .flat_map(|f| f.footprint().polygons()),
        );
        if stairs.0.is_empty() {
            return 0.0;
        }
        let walls = bool2d::union_all(self.separators().flat_map(|s| s.footprint().polygons()));
        bool2d::difference(&stairs, &walls).unsigned_area()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Derived outlines of a layout.
//!
//! Unions go through a small round trip: every piece is grown by the union
//! buffer and snapped to the rounding grid, the pieces are fused, and the
//! result is shrunk back. This closes the hairline gaps left between
//! annotated polygons that should touch.

use floorplan_geometry::{bool2d, buffer, Footprint, MultiPolygon, Polygon};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::Layout;
use crate::entity::Spatial;
use crate::error::{Error, Result};
use crate::space::Space;
use crate::types::{AreaType, FeatureType, SeparatorType};

impl Layout {
    /// Outline of every space and separator.
    ///
    /// When the floor falls apart into several pieces only their exterior
    /// rings are kept.
    pub fn footprint(&self) -> Result<&Footprint> {
        if let Some(footprint) = self.cache.footprint.get() {
            return Ok(footprint);
        }
        self.ensure_absolute("layout")?;
        let parts = self
            .spaces()
            .flat_map(|s| s.footprint().polygons())
            .chain(self.separators().flat_map(|s| s.footprint().polygons()));
        let mut fused = self.fuse(parts);
        if fused.0.len() > 1 {
            fused = bool2d::union_all(buffer::remove_holes(&fused).0.iter());
        }
        let footprint = self.non_empty("layout", fused)?;
        debug!(parts = footprint.part_count(), area = footprint.area(), "layout footprint computed");
        Ok(self.cache.footprint.get_or_init(|| footprint))
    }

    /// Outline of the areas not in `excluded`, optionally with separators.
    ///
    /// Railings that only border excluded areas are left out with them.
    /// Holes below the small-hole area are filled.
    pub fn footprint_excluding_areas(
        &self,
        excluded: &FxHashSet<AreaType>,
        include_separators: bool,
    ) -> Result<Footprint> {
        self.ensure_absolute("layout")?;
        let kept_areas: Vec<_> = self
            .areas()
            .filter(|a| !excluded.contains(&a.area_type()))
            .collect();
        let mut parts: Vec<&Polygon<f64>> = kept_areas
            .iter()
            .flat_map(|a| a.footprint().polygons())
            .collect();

        if include_separators {
            let areas_separators = self.areas_separators();
            let bordering_kept: FxHashSet<&str> = kept_areas
                .iter()
                .filter_map(|a| areas_separators.get(a.id()))
                .flatten()
                .map(String::as_str)
                .collect();
            let bordering_any: FxHashSet<&str> = areas_separators
                .values()
                .flatten()
                .map(String::as_str)
                .collect();
            for separator in self.separators() {
                let id = separator.id();
                let only_excluded = separator.separator_type() == SeparatorType::Railing
                    && bordering_any.contains(id)
                    && !bordering_kept.contains(id);
                if !only_excluded {
                    parts.extend(separator.footprint().polygons());
                }
            }
        }

        let fused = self.fuse(parts);
        let filled = buffer::remove_small_holes(&fused, self.tolerances.small_hole_area);
        self.non_empty("layout", filled)
    }

    pub fn footprint_excluding_balconies(&self) -> Result<Footprint> {
        self.footprint_excluding_areas(&self.scheme.balcony_areas, true)
    }

    pub fn footprint_excluding_areas_without_ceiling(&self) -> Result<Footprint> {
        self.footprint_excluding_areas(&self.scheme.areas_without_ceiling, true)
    }

    pub fn footprint_excluding_areas_without_floor(&self) -> Result<Footprint> {
        self.footprint_excluding_areas(&self.scheme.areas_without_floor, true)
    }

    /// Walkable outline: spaces and doorways, without voids or features.
    ///
    /// Stairs stay walkable. Slivers thinner than the cleanup buffer and
    /// pieces below the minimum piece area are dropped.
    pub fn get_footprint_no_features(&self) -> Result<Footprint> {
        self.ensure_absolute("layout")?;
        let t = &self.tolerances;
        let walkable = self.fuse(
            self.spaces()
                .flat_map(|s| s.footprint().polygons())
                .chain(
                    self.openings()
                        .filter(|o| o.is_door())
                        .flat_map(|o| o.footprint().polygons()),
                ),
        );
        let voids = bool2d::union_all(
            self.areas()
                .filter(|a| self.scheme.void_areas.contains(&a.area_type()))
                .flat_map(|a| a.footprint().polygons()),
        );
        let features = bool2d::union_all(
            self.features()
                .filter(|f| f.feature_type() != FeatureType::Stairs)
                .flat_map(|f| f.footprint().polygons()),
        );
        let remaining = bool2d::difference(&bool2d::difference(&walkable, &voids), &features);
        let cleaned = buffer::open(&remaining, t.cleanup_buffer);
        let kept = buffer::drop_small_pieces(&cleaned, t.min_footprint_piece_area);
        debug!(
            pieces = kept.0.len(),
            dropped = cleaned.0.len() - kept.0.len(),
            "footprint without features computed"
        );
        self.non_empty("layout", kept)
    }

    /// Union of `spaces`, optionally clipped.
    ///
    /// For private (non-public) spaces the union is closed with a growing
    /// mitre buffer until it is connected. If it is still disconnected after
    /// the iteration cap the last attempt is returned as is.
    pub fn get_spaces_union(
        &self,
        spaces: &[&Space],
        public_space: bool,
        clip_to: Option<&Footprint>,
    ) -> Result<Footprint> {
        self.ensure_absolute("spaces union")?;
        let t = &self.tolerances;
        let base = self.fuse(spaces.iter().flat_map(|s| s.footprint().polygons()));
        let mut union = base.clone();
        if !public_space && union.0.len() > 1 {
            let mut converged = false;
            for i in 1..=t.spaces_union_max_iterations {
                union = buffer::close(&base, t.spaces_union_growth_step * i as f64);
                if union.0.len() <= 1 {
                    debug!(iterations = i, "spaces union connected");
                    converged = true;
                    break;
                }
            }
            if !converged {
                warn!(
                    spaces = spaces.len(),
                    parts = union.0.len(),
                    "spaces union did not converge to a single polygon"
                );
            }
        }
        if let Some(clip) = clip_to {
            union = bool2d::intersection(&union, &clip.to_multi());
        }
        self.non_empty("spaces union", union)
    }

    /// Buffer-round-union-unbuffer over `parts`.
    pub(super) fn fuse<'a>(
        &self,
        parts: impl IntoIterator<Item = &'a Polygon<f64>>,
    ) -> MultiPolygon<f64> {
        let t = &self.tolerances;
        let grown: Vec<Polygon<f64>> = parts
            .into_iter()
            .flat_map(|p| buffer::buffer_mitre(&MultiPolygon::new(vec![p.clone()]), t.union_buffer).0)
            .collect();
        let rounded = buffer::round_coordinates(&MultiPolygon::new(grown), t.rounding_precision);
        let merged = bool2d::union_all(rounded.0.iter());
        buffer::buffer_mitre(&merged, -t.union_buffer)
    }

    fn non_empty(&self, what: &str, multi: MultiPolygon<f64>) -> Result<Footprint> {
        if multi.0.is_empty() {
            return Err(Error::invalid_shape(what, "derived footprint is empty"));
        }
        Ok(Footprint::from_multi(multi))
    }
}

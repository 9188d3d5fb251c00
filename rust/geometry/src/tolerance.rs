// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named tolerances for footprint algebra.
//!
//! Every epsilon and buffer distance used by the footprint algorithms lives
//! here so that callers can tune them (or tests can exaggerate them) without
//! touching algorithm code. Distances are in layout units (metres for
//! georeferenced plans).

use serde::Deserialize;

use crate::error::{Error, Result};

/// Tolerance configuration passed into every footprint algorithm.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryTolerances {
    /// Outward buffer applied to each piece before a union and removed after.
    pub union_buffer: f64,
    /// Decimal places kept when rounding coordinates before a union.
    pub rounding_precision: u32,
    /// Scale factor applied to separators before joining them with areas.
    pub separator_widening_factor: f64,
    /// Mitre buffer radius used when measuring boundary contact for wall surfaces.
    pub wall_surface_buffer: f64,
    /// Outward offset of an opening's reference geometry, as a ratio of its span.
    pub opening_reference_offset_ratio: f64,
    /// Homothetic scale of the feature side projected towards nearby walls.
    pub feature_projection_scale: f64,
    /// Buffer/unbuffer distance that removes sub-centimetre artefacts.
    pub cleanup_buffer: f64,
    /// Pieces of a cleaned footprint smaller than this are discarded.
    pub min_footprint_piece_area: f64,
    /// Holes smaller than this are filled in exclusion footprints.
    pub small_hole_area: f64,
    /// Growth distance per iteration when fusing private spaces.
    pub spaces_union_growth_step: f64,
    /// Iteration cap when fusing private spaces.
    pub spaces_union_max_iterations: usize,
    /// Overlaps with less area than this do not count as intersections.
    pub overlap_area_epsilon: f64,
    /// Cell size of the bounding-box grid index.
    pub index_cell_size: f64,
}

impl Default for GeometryTolerances {
    fn default() -> Self {
        Self {
            union_buffer: 1e-6,
            rounding_precision: 6,
            separator_widening_factor: 1.02,
            wall_surface_buffer: 1e-3,
            opening_reference_offset_ratio: 0.1,
            feature_projection_scale: 5.0,
            cleanup_buffer: 0.01,
            min_footprint_piece_area: 1.0,
            small_hole_area: 0.01,
            spaces_union_growth_step: 0.05,
            spaces_union_max_iterations: 20,
            overlap_area_epsilon: 1e-6,
            index_cell_size: 2.0,
        }
    }
}

impl GeometryTolerances {
    /// Loads tolerances from JSON. Missing fields keep their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let tolerances: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        tolerances.validate()?;
        Ok(tolerances)
    }

    /// Rejects values that would make the algorithms meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.union_buffer <= 0.0 || self.cleanup_buffer <= 0.0 {
            return Err(Error::Config("buffer distances must be positive".into()));
        }
        if self.index_cell_size <= 0.0 {
            return Err(Error::Config("index cell size must be positive".into()));
        }
        if self.separator_widening_factor < 1.0 {
            return Err(Error::Config(
                "separator widening factor must not shrink separators".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let t = GeometryTolerances::from_json(r#"{"cleanup_buffer": 0.02}"#).unwrap();
        assert_eq!(t.cleanup_buffer, 0.02);
        assert_eq!(t.spaces_union_max_iterations, 20);
        assert_eq!(t.min_footprint_piece_area, 1.0);
    }

    #[test]
    fn rejects_shrinking_separators() {
        let err = GeometryTolerances::from_json(r#"{"separator_widening_factor": 0.9}"#);
        assert!(matches!(err, Err(Error::Config(_))));
    }
}

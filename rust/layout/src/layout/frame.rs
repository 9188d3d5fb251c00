// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate-frame transforms of a whole layout.
//!
//! Both transforms work on copies and only swap them in once every entity
//! converted, so a failure leaves the layout untouched.
//!
//! Relationships and outlines are only meaningful between absolute
//! footprints. The relative conversion therefore computes every derived
//! cache first and keeps it; outline queries whose cache is still empty
//! afterwards fail with `InvalidShape`.

use floorplan_geometry::GeoreferenceTransform;
use geo::Point;
use tracing::{debug, info};

use super::Layout;
use crate::entity::Spatial;
use crate::error::Result;

impl Layout {
    /// Re-expresses every entity relative to its parent.
    ///
    /// Separators and spaces are placed relative to the origin, openings
    /// relative to their separator, areas relative to their space and
    /// features relative to their area. Does nothing the second time.
    ///
    /// Relationship indices, the layout footprint and the non-overlapping
    /// separators keep the values computed from the absolute frame.
    pub fn absolute_to_relative_coordinates(&mut self) -> Result<()> {
        if self.is_in_relative_coordinates {
            return Ok(());
        }
        self.compute_derived_caches();
        let origin = Point::new(0.0, 0.0);
        let mut separators = self.separators.clone();
        for separator in separators.values_mut() {
            separator.to_relative(origin)?;
        }
        let mut spaces = self.spaces.clone();
        for space in spaces.values_mut() {
            space.to_relative(origin)?;
        }
        let mut unassigned = self.unassigned_features.clone();
        for feature in &mut unassigned {
            feature.entity_mut().footprint_absolute_to_relative(origin)?;
        }

        self.separators = separators;
        self.spaces = spaces;
        self.unassigned_features = unassigned;
        self.is_in_relative_coordinates = true;
        info!(floor = self.floor_number, "layout converted to relative coordinates");
        Ok(())
    }

    /// Maps every entity through `transform`, children before parents.
    pub fn apply_georeference_transformation(
        &mut self,
        transform: &dyn GeoreferenceTransform,
    ) -> Result<()> {
        let mut separators = self.separators.clone();
        for separator in separators.values_mut() {
            separator.apply_georeference(transform)?;
        }
        let mut spaces = self.spaces.clone();
        for space in spaces.values_mut() {
            space.apply_georeference(transform)?;
        }
        let mut unassigned = self.unassigned_features.clone();
        for feature in &mut unassigned {
            feature.apply_georeference(transform)?;
        }

        self.separators = separators;
        self.spaces = spaces;
        self.unassigned_features = unassigned;
        self.reset_cache();
        info!(
            floor = self.floor_number,
            rotation = transform.rotation_angle(),
            scale = transform.scale_factor(),
            "layout georeferenced"
        );
        Ok(())
    }

    fn compute_derived_caches(&self) {
        self.areas_openings();
        self.areas_separators();
        self.spaces_openings();
        self.spaces_separators();
        self.outdoor_doors();
        self.outdoor_spaces();
        if let Err(error) = self.footprint() {
            debug!(error = %error, "no layout footprint to keep");
        }
        if let Err(error) = self.non_overlapping_separators() {
            debug!(error = %error, "no non-overlapping separators to keep");
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walls, railings, columns and area splitters.

use std::collections::BTreeMap;

use floorplan_geometry::{Footprint, GeoreferenceTransform, RectSides};
use geo::{Line, Point, Polygon};

use crate::entity::{EntityId, Height, Spatial, SpatialEntity};
use crate::error::{Error, Result};
use crate::opening::Opening;
use crate::types::SeparatorType;

#[derive(Debug, Clone)]
pub struct Separator {
    entity: SpatialEntity,
    separator_type: SeparatorType,
    openings: BTreeMap<EntityId, Opening>,
}

impl Separator {
    pub fn new(
        id: impl Into<EntityId>,
        separator_type: SeparatorType,
        polygon: &Polygon<f64>,
        height: Height,
    ) -> Result<Self> {
        Ok(Self {
            entity: SpatialEntity::new(id, polygon, height)?,
            separator_type,
            openings: BTreeMap::new(),
        })
    }

    /// A piece of this separator with a new id and footprint, no openings.
    pub(crate) fn split_off(&self, id: impl Into<EntityId>, footprint: Footprint) -> Self {
        let mut entity = SpatialEntity::with_footprint(id, footprint, self.height());
        entity.set_angle(self.entity.angle());
        entity.set_direction(self.entity.direction());
        Self {
            entity,
            separator_type: self.separator_type,
            openings: BTreeMap::new(),
        }
    }

    pub fn separator_type(&self) -> SeparatorType {
        self.separator_type
    }

    /// Adds an opening; an opening with the same id is replaced.
    pub fn add_opening(&mut self, opening: Opening) {
        self.openings.insert(opening.id().to_string(), opening);
    }

    /// Owned openings, ordered by id.
    pub fn openings(&self) -> impl Iterator<Item = &Opening> + '_ {
        self.openings.values()
    }

    pub(crate) fn openings_mut(&mut self) -> impl Iterator<Item = &mut Opening> + '_ {
        self.openings.values_mut()
    }

    pub fn opening(&self, id: &str) -> Option<&Opening> {
        self.openings.get(id)
    }

    pub fn opening_count(&self) -> usize {
        self.openings.len()
    }

    /// Centre line along the long axis of the rotated rectangle.
    pub fn reference_line(&self) -> Result<Line<f64>> {
        RectSides::of(self.footprint())
            .map(|sides| sides.centre_line())
            .ok_or_else(|| Error::invalid_shape(self.id().to_string(), "no rotated rectangle"))
    }

    /// Gross surface area minus the surface of every owned opening.
    pub fn surface_area(&self) -> f64 {
        let openings: f64 = self.openings.values().map(|o| o.entity().surface_area()).sum();
        self.entity.surface_area() - openings
    }

    /// Moves the separator and its openings into relative coordinates.
    ///
    /// Openings are positioned relative to the separator's absolute centroid.
    pub(crate) fn to_relative(&mut self, parent_position: Point<f64>) -> Result<()> {
        let centroid = self.entity.centroid()?;
        for opening in self.openings.values_mut() {
            opening.to_relative(centroid)?;
        }
        self.entity.footprint_absolute_to_relative(parent_position)
    }

    pub(crate) fn apply_georeference(&mut self, transform: &dyn GeoreferenceTransform) -> Result<()> {
        for opening in self.openings.values_mut() {
            opening.apply_georeference(transform)?;
        }
        self.entity.apply_georeference(transform)
    }
}

impl Spatial for Separator {
    fn entity(&self) -> &SpatialEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut SpatialEntity {
        &mut self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpeningType;
    use approx::assert_relative_eq;
    use floorplan_geometry::rectangle;

    fn wall_with_door() -> Separator {
        let mut wall = Separator::new(
            "w",
            SeparatorType::Wall,
            &rectangle(0.0, 0.0, 5.0, 0.2),
            Height::new(0.0, 3.0).unwrap(),
        )
        .unwrap();
        let door = Opening::new(
            "d",
            OpeningType::Door,
            &rectangle(1.0, 0.0, 2.0, 0.2),
            Height::new(0.0, 2.0).unwrap(),
            &wall,
        )
        .unwrap();
        wall.add_opening(door);
        wall
    }

    #[test]
    fn net_surface_subtracts_openings() {
        let wall = wall_with_door();
        // 3.0 * 5.0 gross, 2.0 * 1.0 door
        assert_relative_eq!(wall.surface_area(), 13.0, epsilon = 1e-9);
    }

    #[test]
    fn add_opening_is_keyed_by_id() {
        let mut wall = wall_with_door();
        let again = wall.opening("d").unwrap().clone();
        wall.add_opening(again);
        assert_eq!(wall.opening_count(), 1);
        assert_eq!(wall.opening("d").unwrap().separator_id(), "w");
    }

    #[test]
    fn relative_openings_follow_their_separator() {
        let mut wall = wall_with_door();
        wall.to_relative(Point::new(0.0, 0.0)).unwrap();
        assert_relative_eq!(wall.entity().position().x(), 2.5, epsilon = 1e-9);
        let door = wall.opening("d").unwrap();
        assert_relative_eq!(door.entity().position().x(), -1.0, epsilon = 1e-9);
        assert_relative_eq!(door.entity().position().y(), 0.0, epsilon = 1e-9);
    }
}

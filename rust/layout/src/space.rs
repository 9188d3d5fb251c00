// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connected groups of areas.

use std::collections::BTreeMap;

use floorplan_geometry::{bool2d, Footprint, GeoreferenceTransform};
use geo::{Point, Polygon};

use crate::area::Area;
use crate::entity::{EntityId, Height, Spatial, SpatialEntity};
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::types::FeatureType;

#[derive(Debug, Clone)]
pub struct Space {
    entity: SpatialEntity,
    areas: BTreeMap<EntityId, Area>,
}

impl Space {
    pub fn new(id: impl Into<EntityId>, polygon: &Polygon<f64>, height: Height) -> Result<Self> {
        Ok(Self {
            entity: SpatialEntity::new(id, polygon, height)?,
            areas: BTreeMap::new(),
        })
    }

    /// A space whose footprint is the union of its areas.
    pub fn from_areas(
        id: impl Into<EntityId>,
        areas: impl IntoIterator<Item = Area>,
        height: Height,
    ) -> Result<Self> {
        let id = id.into();
        let areas: BTreeMap<EntityId, Area> = areas
            .into_iter()
            .map(|a| (a.id().to_string(), a))
            .collect();
        let union = bool2d::union_all(areas.values().flat_map(|a| a.footprint().polygons()));
        if union.0.is_empty() {
            return Err(Error::invalid_shape(id, "space has no areas"));
        }
        Ok(Self {
            entity: SpatialEntity::with_footprint(id, Footprint::from_multi(union), height),
            areas,
        })
    }

    /// Adds an area; an area with the same id is replaced.
    pub fn add_area(&mut self, area: Area) {
        self.areas.insert(area.id().to_string(), area);
    }

    pub fn areas(&self) -> impl Iterator<Item = &Area> + '_ {
        self.areas.values()
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.get(id)
    }

    pub fn area_mut(&mut self, id: &str) -> Option<&mut Area> {
        self.areas.get_mut(id)
    }

    pub(crate) fn areas_mut(&mut self) -> impl Iterator<Item = &mut Area> + '_ {
        self.areas.values_mut()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Features of every area.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.areas.values().flat_map(|a| a.features())
    }

    pub fn has_toilet(&self) -> bool {
        self.features()
            .any(|f| f.feature_type() == FeatureType::Toilet)
    }

    pub(crate) fn to_relative(&mut self, parent_position: Point<f64>) -> Result<()> {
        let centroid = self.entity.centroid()?;
        for area in self.areas.values_mut() {
            area.to_relative(centroid)?;
        }
        self.entity.footprint_absolute_to_relative(parent_position)
    }

    pub(crate) fn apply_georeference(&mut self, transform: &dyn GeoreferenceTransform) -> Result<()> {
        for area in self.areas.values_mut() {
            area.apply_georeference(transform)?;
        }
        self.entity.apply_georeference(transform)
    }
}

impl Spatial for Space {
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
    use crate::types::AreaType;
    use approx::assert_relative_eq;
    use floorplan_geometry::rectangle;

    fn bathroom() -> Area {
        let mut area = Area::new(
            "bath",
            AreaType::Bathroom,
            &rectangle(0.0, 0.0, 2.0, 2.0),
            Height::default(),
        )
        .unwrap();
        area.add_feature(
            Feature::new(
                "wc",
                FeatureType::Toilet,
                &rectangle(0.1, 0.1, 0.5, 0.8),
                Height::default(),
            )
            .unwrap(),
        );
        area
    }

    #[test]
    fn from_areas_unions_footprints() {
        let corridor = Area::new(
            "corridor",
            AreaType::Corridor,
            &rectangle(2.0, 0.0, 5.0, 2.0),
            Height::default(),
        )
        .unwrap();
        let space = Space::from_areas("s", [bathroom(), corridor], Height::default()).unwrap();
        assert!(space.footprint().is_single());
        assert_relative_eq!(space.footprint().area(), 10.0, epsilon = 1e-6);
        assert_eq!(space.area_count(), 2);
    }

    #[test]
    fn toilet_is_found_through_areas() {
        let space = Space::from_areas("s", [bathroom()], Height::default()).unwrap();
        assert!(space.has_toilet());
        assert_eq!(space.features().count(), 1);
    }

    #[test]
    fn empty_space_is_rejected() {
        assert!(Space::from_areas("s", Vec::new(), Height::default()).is_err());
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed regions of a space and the features placed in them.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use floorplan_geometry::{bool2d, buffer, Footprint, GeoreferenceTransform};
use geo::{Point, Polygon};

use crate::entity::{EntityId, Height, Spatial, SpatialEntity};
use crate::error::Result;
use crate::feature::Feature;
use crate::layout::Layout;
use crate::types::{AreaType, FeatureType};

#[derive(Debug, Clone)]
pub struct Area {
    entity: SpatialEntity,
    area_type: AreaType,
    features: BTreeMap<EntityId, Feature>,
    external_id: Option<String>,
    without_stairs: OnceCell<Footprint>,
}

impl Area {
    pub fn new(
        id: impl Into<EntityId>,
        area_type: AreaType,
        polygon: &Polygon<f64>,
        height: Height,
    ) -> Result<Self> {
        Ok(Self {
            entity: SpatialEntity::new(id, polygon, height)?,
            area_type,
            features: BTreeMap::new(),
            external_id: None,
            without_stairs: OnceCell::new(),
        })
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn area_type(&self) -> AreaType {
        self.area_type
    }

    pub fn set_area_type(&mut self, area_type: AreaType) {
        self.area_type = area_type;
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Adds a feature; a feature with the same id is replaced.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.insert(feature.id().to_string(), feature);
        self.without_stairs = OnceCell::new();
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.values()
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn has_feature_of_type(&self, feature_type: FeatureType) -> bool {
        self.features
            .values()
            .any(|f| f.feature_type() == feature_type)
    }

    /// Footprint minus every owned stairs feature.
    pub fn area_without_stairs(&self) -> &Footprint {
        self.without_stairs.get_or_init(|| {
            let stairs: Vec<&Polygon<f64>> = self
                .features
                .values()
                .filter(|f| f.feature_type() == FeatureType::Stairs)
                .flat_map(|f| f.footprint().polygons())
                .collect();
            if stairs.is_empty() {
                return self.footprint().clone();
            }
            let clip = bool2d::union_all(stairs);
            Footprint::from_multi(bool2d::difference(&self.footprint().to_multi(), &clip))
        })
    }

    /// Vertical wall surface around the area.
    ///
    /// Perimeter times height, minus the stretches of boundary taken by
    /// openings (at the opening's height) and by railings or area splitters
    /// (at the area's height). Never negative.
    pub fn wall_surface_area(&self, layout: &Layout) -> f64 {
        let span = self.height().span();
        let gross = self.footprint().exterior_length() * span;
        let buffer_radius = layout.tolerances().wall_surface_buffer;

        let contact = |element: &Footprint| -> f64 {
            let grown = Footprint::from_multi(buffer::buffer_mitre(&element.to_multi(), buffer_radius));
            self.footprint()
                .polygons()
                .iter()
                .map(|p| bool2d::boundary_length_inside(p.exterior(), &grown))
                .sum()
        };

        let mut deduction = 0.0;
        if let Some(ids) = layout.areas_openings().get(self.id()) {
            for opening in ids.iter().filter_map(|id| layout.opening_by_id(id)) {
                deduction += opening.height().span() * contact(opening.footprint());
            }
        }
        if let Some(ids) = layout.areas_separators().get(self.id()) {
            for separator in ids
                .iter()
                .filter_map(|id| layout.separator_by_id(id))
                .filter(|s| s.separator_type().is_non_envelope())
            {
                deduction += span * contact(separator.footprint());
            }
        }
        (gross - deduction).max(0.0)
    }

    pub(crate) fn to_relative(&mut self, parent_position: Point<f64>) -> Result<()> {
        let centroid = self.entity.centroid()?;
        for feature in self.features.values_mut() {
            feature.entity_mut().footprint_absolute_to_relative(centroid)?;
        }
        self.entity.footprint_absolute_to_relative(parent_position)?;
        self.without_stairs = OnceCell::new();
        Ok(())
    }

    pub(crate) fn apply_georeference(&mut self, transform: &dyn GeoreferenceTransform) -> Result<()> {
        for feature in self.features.values_mut() {
            feature.apply_georeference(transform)?;
        }
        self.entity.apply_georeference(transform)?;
        self.without_stairs = OnceCell::new();
        Ok(())
    }
}

impl Spatial for Area {
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
    use approx::assert_relative_eq;
    use floorplan_geometry::rectangle;

    #[test]
    fn stairs_are_cut_out() {
        let mut area = Area::new(
            "a",
            AreaType::Staircase,
            &rectangle(0.0, 0.0, 4.0, 4.0),
            Height::default(),
        )
        .unwrap();
        area.add_feature(
            Feature::new(
                "s",
                FeatureType::Stairs,
                &rectangle(0.0, 0.0, 1.0, 3.0),
                Height::default(),
            )
            .unwrap(),
        );
        area.add_feature(
            Feature::new(
                "t",
                FeatureType::Toilet,
                &rectangle(3.0, 3.0, 3.5, 3.7),
                Height::default(),
            )
            .unwrap(),
        );
        assert_relative_eq!(area.area_without_stairs().area(), 13.0, epsilon = 1e-6);
        assert!(area.has_feature_of_type(FeatureType::Toilet));
        assert!(!area.has_feature_of_type(FeatureType::Elevator));
    }

    #[test]
    fn railing_is_deducted_at_the_area_height() {
        use crate::classification::ClassificationScheme;
        use crate::layout::LayoutBuilder;
        use crate::separator::Separator;
        use crate::space::Space;
        use crate::types::SeparatorType;

        let balcony = Area::new(
            "balcony",
            AreaType::Balcony,
            &rectangle(0.0, 0.0, 3.0, 2.0),
            Height::default(),
        )
        .unwrap();
        let railing = Separator::new(
            "railing",
            SeparatorType::Railing,
            &rectangle(0.0, 2.0, 3.0, 2.05),
            Height::new(0.0, 1.1).unwrap(),
        )
        .unwrap();
        let wall = Separator::new(
            "wall",
            SeparatorType::Wall,
            &rectangle(3.0, 0.0, 3.2, 2.0),
            Height::default(),
        )
        .unwrap();
        let mut builder = LayoutBuilder::new(ClassificationScheme::unified());
        builder
            .add_spaces([Space::from_areas("s", [balcony], Height::default()).unwrap()])
            .add_separators([railing, wall]);
        let layout = builder.build().unwrap();

        let area = layout.area_by_id("balcony").unwrap();
        let separators = &layout.areas_separators()["balcony"];
        assert!(separators.contains("railing") && separators.contains("wall"));
        // the railing takes the 3 m edge plus the buffer at both ends; the wall is not deducted
        let buffer = layout.tolerances().wall_surface_buffer;
        let expected = 2.6 * (10.0 - (3.0 + 2.0 * buffer));
        assert_relative_eq!(area.wall_surface_area(&layout), expected, epsilon = 1e-4);
    }

    #[test]
    fn area_type_is_settable() {
        let mut area = Area::new(
            "a",
            AreaType::NotDefined,
            &rectangle(0.0, 0.0, 1.0, 1.0),
            Height::default(),
        )
        .unwrap()
        .with_external_id("ext-7");
        area.set_area_type(AreaType::Bathroom);
        assert_eq!(area.area_type(), AreaType::Bathroom);
        assert_eq!(area.external_id(), Some("ext-7"));
    }
}

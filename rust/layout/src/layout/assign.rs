// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder-phase assignment of features and inference of area types.

use floorplan_geometry::{bool2d, FootprintIndex};
use tracing::{debug, warn};

use super::LayoutBuilder;
use crate::entity::{EntityId, Spatial};
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::types::{AreaType, FeatureType};

impl LayoutBuilder {
    /// Moves every queued feature into the single area it overlaps.
    ///
    /// Features overlapping no area, or more than one, stay unassigned and
    /// are logged. Returns the number of features assigned.
    pub fn assign_features_to_areas(&mut self) -> usize {
        // (space id, area id) of every area, in iteration order
        let targets: Vec<(EntityId, EntityId)> = self
            .spaces
            .values()
            .flat_map(|s| s.areas().map(|a| (s.id().to_string(), a.id().to_string())))
            .collect();
        let footprints: Vec<_> = self
            .spaces
            .values()
            .flat_map(|s| s.areas().map(|a| a.footprint()))
            .collect();
        let index = FootprintIndex::build(footprints.iter().copied(), self.tolerances.index_cell_size);

        let mut decisions = Vec::with_capacity(self.unassigned_features.len());
        for feature in &self.unassigned_features {
            match exclusive_area(feature, &footprints, &index, self.tolerances.overlap_area_epsilon) {
                Ok(i) => decisions.push(Some(i)),
                Err(err) => {
                    warn!(feature = feature.id(), error = %err, "feature left unassigned");
                    decisions.push(None);
                }
            }
        }

        let features = std::mem::take(&mut self.unassigned_features);
        let mut assigned = 0;
        for (feature, decision) in features.into_iter().zip(decisions) {
            let target = decision.and_then(|i| targets.get(i));
            let area = target.and_then(|(space_id, area_id)| {
                self.spaces.get_mut(space_id).and_then(|s| s.area_mut(area_id))
            });
            match area {
                Some(area) => {
                    area.add_feature(feature);
                    assigned += 1;
                }
                None => self.unassigned_features.push(feature),
            }
        }
        debug!(
            assigned,
            unassigned = self.unassigned_features.len(),
            "features assigned to areas"
        );
        assigned
    }

    /// Types untyped areas from the features they contain.
    ///
    /// Priority is elevator, then water connection, then shaft, then stairs;
    /// the resulting types come from the classification scheme. Areas that
    /// already have a type are left alone. Returns the number of areas typed.
    pub fn set_area_types_based_on_feature_types(&mut self) -> usize {
        let scheme = &self.scheme;
        let mut typed = 0;
        for space in self.spaces.values_mut() {
            for area in space.areas_mut() {
                if area.area_type() != AreaType::NotDefined {
                    continue;
                }
                let has = |pred: &dyn Fn(FeatureType) -> bool| {
                    area.features().any(|f| pred(f.feature_type()))
                };
                let inferred = if has(&|t| t == FeatureType::Elevator) {
                    Some(scheme.default_elevator_area)
                } else if has(&|t| t.is_water_connection()) {
                    Some(scheme.default_water_connection_area)
                } else if has(&|t| t == FeatureType::Shaft) {
                    Some(scheme.default_shaft_area)
                } else if has(&|t| t == FeatureType::Stairs) {
                    Some(scheme.default_stair_area)
                } else {
                    None
                };
                if let Some(area_type) = inferred {
                    debug!(area = area.id(), %area_type, "area type inferred from features");
                    area.set_area_type(area_type);
                    typed += 1;
                }
            }
        }
        typed
    }
}

/// Index of the only area the feature overlaps.
fn exclusive_area(
    feature: &Feature,
    footprints: &[&floorplan_geometry::Footprint],
    index: &FootprintIndex,
    epsilon: f64,
) -> Result<usize> {
    let Some(bbox) = feature.footprint().bounding_rect() else {
        return Err(Error::CorruptedAnnotation {
            feature: feature.id().to_string(),
            candidates: 0,
        });
    };
    let candidates: Vec<usize> = index
        .query(bbox)
        .into_iter()
        .filter(|&i| bool2d::overlap_area(footprints[i], feature.footprint()) > epsilon)
        .collect();
    match candidates.as_slice() {
        [only] => Ok(*only),
        _ => Err(Error::CorruptedAnnotation {
            feature: feature.id().to_string(),
            candidates: candidates.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::classification::ClassificationScheme;
    use crate::entity::Height;
    use crate::space::Space;
    use floorplan_geometry::rectangle;

    fn builder() -> LayoutBuilder {
        let left = Area::new(
            "left",
            AreaType::NotDefined,
            &rectangle(0.0, 0.0, 2.0, 2.0),
            Height::default(),
        )
        .unwrap();
        let right = Area::new(
            "right",
            AreaType::NotDefined,
            &rectangle(2.0, 0.0, 4.0, 2.0),
            Height::default(),
        )
        .unwrap();
        let mut builder = LayoutBuilder::new(ClassificationScheme::unified());
        builder.add_spaces([Space::from_areas("s", [left, right], Height::default()).unwrap()]);
        builder
    }

    fn feature(id: &str, feature_type: FeatureType, rect: geo::Polygon<f64>) -> Feature {
        Feature::new(id, feature_type, &rect, Height::default()).unwrap()
    }

    #[test]
    fn exclusive_features_are_assigned() {
        let mut b = builder();
        b.add_features([
            feature("wc", FeatureType::Toilet, rectangle(0.2, 0.2, 0.6, 0.9)),
            feature("straddle", FeatureType::Sink, rectangle(1.8, 0.5, 2.2, 1.0)),
            feature("outside", FeatureType::Sink, rectangle(9.0, 9.0, 9.5, 9.5)),
        ]);
        assert_eq!(b.assign_features_to_areas(), 1);
        let ids: Vec<&str> = b.unassigned_features().iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["straddle", "outside"]);
        let space = b.spaces().next().unwrap();
        assert!(space.area("left").unwrap().feature("wc").is_some());
    }

    #[test]
    fn area_types_follow_feature_priority() {
        let mut b = builder();
        b.add_features([
            feature("wc", FeatureType::Toilet, rectangle(0.2, 0.2, 0.6, 0.9)),
            feature("lift", FeatureType::Elevator, rectangle(1.0, 1.0, 1.8, 1.8)),
            feature("shaft", FeatureType::Shaft, rectangle(2.5, 0.5, 3.0, 1.0)),
        ]);
        b.assign_features_to_areas();
        assert_eq!(b.set_area_types_based_on_feature_types(), 2);
        let space = b.spaces().next().unwrap();
        assert_eq!(space.area("left").unwrap().area_type(), AreaType::Elevator);
        assert_eq!(space.area("right").unwrap().area_type(), AreaType::Shaft);
        // already typed areas are not touched again
        assert_eq!(b.set_area_types_based_on_feature_types(), 0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial joins between areas, spaces, openings and separators.

use std::collections::BTreeSet;

use floorplan_geometry::{bool2d, Footprint, FootprintIndex};
use geo::Coord;
use tracing::debug;

use super::{IdIndex, Layout};
use crate::area::Area;
use crate::entity::{EntityId, Spatial};
use crate::types::OpeningType;

impl Layout {
    /// Openings whose reference geometry overlaps each area.
    pub fn areas_openings(&self) -> &IdIndex {
        self.cache.areas_openings.get_or_init(|| {
            let index = self.join_areas(self.openings().map(|o| {
                (
                    o.id().to_string(),
                    Footprint::from(o.reference_geometry().clone()),
                )
            }));
            debug!(areas = index.len(), links = link_count(&index), "areas_openings computed");
            index
        })
    }

    /// Separators, slightly widened, that overlap each area.
    pub fn areas_separators(&self) -> &IdIndex {
        self.cache.areas_separators.get_or_init(|| {
            let factor = self.tolerances.separator_widening_factor;
            let index = self.join_areas(self.separators().map(|s| {
                let widened = match s.footprint().centroid() {
                    Some(c) => s.footprint().map_coords(|p| Coord {
                        x: c.x() + (p.x - c.x()) * factor,
                        y: c.y() + (p.y - c.y()) * factor,
                    }),
                    None => s.footprint().clone(),
                };
                (s.id().to_string(), widened)
            }));
            debug!(areas = index.len(), links = link_count(&index), "areas_separators computed");
            index
        })
    }

    /// Openings of each space, through its areas.
    pub fn spaces_openings(&self) -> &IdIndex {
        self.cache
            .spaces_openings
            .get_or_init(|| self.flatten_to_spaces(self.areas_openings()))
    }

    /// Separators of each space, through its areas.
    pub fn spaces_separators(&self) -> &IdIndex {
        self.cache
            .spaces_separators
            .get_or_init(|| self.flatten_to_spaces(self.areas_separators()))
    }

    /// Doors touching at least one outdoor area.
    pub fn outdoor_doors(&self) -> &BTreeSet<EntityId> {
        self.cache.outdoor_doors.get_or_init(|| {
            let areas_openings = self.areas_openings();
            self.areas()
                .filter(|a| self.scheme.is_outdoor(a.area_type()))
                .filter_map(|a| areas_openings.get(a.id()))
                .flatten()
                .filter(|id| self.opening_by_id(id).is_some_and(|o| o.is_door()))
                .cloned()
                .collect()
        })
    }

    /// Spaces made only of outdoor areas.
    pub fn outdoor_spaces(&self) -> &BTreeSet<EntityId> {
        self.cache.outdoor_spaces.get_or_init(|| {
            self.spaces()
                .filter(|s| {
                    s.area_count() > 0 && s.areas().all(|a| self.scheme.is_outdoor(a.area_type()))
                })
                .map(|s| s.id().to_string())
                .collect()
        })
    }

    /// Outdoor spaces reachable through an entrance door.
    pub fn outdoor_spaces_connected_by_entrance_door(&self) -> BTreeSet<EntityId> {
        let spaces_openings = self.spaces_openings();
        self.outdoor_spaces()
            .iter()
            .filter(|space_id| {
                spaces_openings.get(*space_id).is_some_and(|openings| {
                    openings.iter().any(|id| {
                        self.opening_by_id(id)
                            .is_some_and(|o| o.opening_type() == OpeningType::EntranceDoor)
                    })
                })
            })
            .cloned()
            .collect()
    }

    /// Joins candidate footprints against every area footprint.
    ///
    /// Every area gets an entry, possibly empty. A pair is linked when the
    /// shared area exceeds the overlap epsilon.
    fn join_areas(&self, candidates: impl Iterator<Item = (EntityId, Footprint)>) -> IdIndex {
        let areas: Vec<&Area> = self.areas().collect();
        let index = FootprintIndex::build(
            areas.iter().map(|a| a.footprint()),
            self.tolerances.index_cell_size,
        );
        let mut joined: IdIndex = areas
            .iter()
            .map(|a| (a.id().to_string(), BTreeSet::new()))
            .collect();
        for (id, footprint) in candidates {
            let Some(bbox) = footprint.bounding_rect() else {
                continue;
            };
            for i in index.query(bbox) {
                let area = areas[i];
                if bool2d::overlap_area(area.footprint(), &footprint)
                    > self.tolerances.overlap_area_epsilon
                {
                    if let Some(set) = joined.get_mut(area.id()) {
                        set.insert(id.clone());
                    }
                }
            }
        }
        joined
    }

    fn flatten_to_spaces(&self, by_area: &IdIndex) -> IdIndex {
        self.spaces()
            .map(|space| {
                let ids = space
                    .areas()
                    .filter_map(|a| by_area.get(a.id()))
                    .flatten()
                    .cloned()
                    .collect();
                (space.id().to_string(), ids)
            })
            .collect()
    }
}

fn link_count(index: &IdIndex) -> usize {
    index.values().map(BTreeSet::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClassificationScheme;
    use crate::entity::Height;
    use crate::layout::LayoutBuilder;
    use crate::opening::Opening;
    use crate::separator::Separator;
    use crate::space::Space;
    use crate::types::{AreaType, SeparatorType};
    use floorplan_geometry::rectangle;

    /// A room and a balcony split by a wall with a door.
    fn room_and_balcony(door_type: OpeningType) -> Layout {
        let room = Area::new(
            "room",
            AreaType::LivingRoom,
            &rectangle(0.0, 0.0, 4.0, 4.0),
            Height::default(),
        )
        .unwrap();
        let balcony = Area::new(
            "balcony",
            AreaType::Balcony,
            &rectangle(4.2, 0.0, 6.0, 4.0),
            Height::default(),
        )
        .unwrap();
        let inside = Space::from_areas("inside", [room], Height::default()).unwrap();
        let outside = Space::from_areas("outside", [balcony], Height::default()).unwrap();
        let mut wall = Separator::new(
            "wall",
            SeparatorType::Wall,
            &rectangle(4.0, 0.0, 4.2, 4.0),
            Height::default(),
        )
        .unwrap();
        let door = Opening::new(
            "door",
            door_type,
            &rectangle(4.0, 1.0, 4.2, 2.0),
            Height::new(0.0, 2.1).unwrap(),
            &wall,
        )
        .unwrap();
        wall.add_opening(door);
        let mut builder = LayoutBuilder::new(ClassificationScheme::unified());
        builder.add_spaces([inside, outside]).add_separators([wall]);
        builder.build().unwrap()
    }

    #[test]
    fn door_links_both_sides() {
        let layout = room_and_balcony(OpeningType::Door);
        let areas_openings = layout.areas_openings();
        assert!(areas_openings["room"].contains("door"));
        assert!(areas_openings["balcony"].contains("door"));
        assert!(layout.spaces_openings()["inside"].contains("door"));
    }

    #[test]
    fn widened_wall_touches_both_areas() {
        let layout = room_and_balcony(OpeningType::Door);
        assert!(layout.areas_separators()["room"].contains("wall"));
        assert!(layout.areas_separators()["balcony"].contains("wall"));
        assert_eq!(layout.spaces_separators().len(), 2);
    }

    #[test]
    fn outdoor_filters() {
        let layout = room_and_balcony(OpeningType::Door);
        assert!(layout.outdoor_doors().contains("door"));
        assert_eq!(
            layout.outdoor_spaces().iter().collect::<Vec<_>>(),
            vec!["outside"]
        );
        assert!(layout.outdoor_spaces_connected_by_entrance_door().is_empty());

        let layout = room_and_balcony(OpeningType::EntranceDoor);
        assert!(layout
            .outdoor_spaces_connected_by_entrance_door()
            .contains("outside"));
    }
}

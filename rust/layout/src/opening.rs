// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Doors and windows hosted by a separator.

use std::cell::OnceCell;

use floorplan_geometry::rect::unit_direction;
use floorplan_geometry::{Footprint, Frame, GeometryTolerances, GeoreferenceTransform, RectSides};
use geo::{Coord, Line, Point, Polygon};

use crate::entity::{EntityId, Height, Spatial, SpatialEntity};
use crate::error::{Error, Result};
use crate::separator::Separator;
use crate::types::{OpeningSubType, OpeningType};

/// Hinge, closed and open points of a swinging door.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorSweep {
    pub hinge: Point<f64>,
    pub closed: Point<f64>,
    pub open: Point<f64>,
}

impl DoorSweep {
    fn map(self, f: impl Fn(Point<f64>) -> Point<f64>) -> Self {
        Self {
            hinge: f(self.hinge),
            closed: f(self.closed),
            open: f(self.open),
        }
    }
}

/// An opening cut into exactly one separator.
#[derive(Debug, Clone)]
pub struct Opening {
    entity: SpatialEntity,
    opening_type: OpeningType,
    sub_type: Option<OpeningSubType>,
    separator_id: EntityId,
    separator_reference_line: Line<f64>,
    sweep: Option<DoorSweep>,
    /// Share of the across-line span added on both sides of the reference
    /// geometry.
    reference_offset_ratio: f64,
    reference: OnceCell<Polygon<f64>>,
}

impl Opening {
    /// Creates an opening hosted by `separator`.
    ///
    /// Only the separator's id and reference line are kept; the separator
    /// owns the opening, not the other way round.
    pub fn new(
        id: impl Into<EntityId>,
        opening_type: OpeningType,
        polygon: &Polygon<f64>,
        height: Height,
        separator: &Separator,
    ) -> Result<Self> {
        Ok(Self::from_entity(
            SpatialEntity::new(id, polygon, height)?,
            opening_type,
            separator.id().to_string(),
            separator.reference_line()?,
        ))
    }

    fn from_entity(
        entity: SpatialEntity,
        opening_type: OpeningType,
        separator_id: EntityId,
        separator_reference_line: Line<f64>,
    ) -> Self {
        Self {
            entity,
            opening_type,
            sub_type: None,
            separator_id,
            separator_reference_line,
            sweep: None,
            reference_offset_ratio: GeometryTolerances::default().opening_reference_offset_ratio,
            reference: OnceCell::new(),
        }
    }

    pub fn with_sub_type(mut self, sub_type: OpeningSubType) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    pub fn with_sweep(mut self, sweep: DoorSweep) -> Self {
        self.sweep = Some(sweep);
        self
    }

    pub fn opening_type(&self) -> OpeningType {
        self.opening_type
    }

    pub fn sub_type(&self) -> Option<OpeningSubType> {
        self.sub_type
    }

    pub fn separator_id(&self) -> &str {
        &self.separator_id
    }

    pub fn separator_reference_line(&self) -> Line<f64> {
        self.separator_reference_line
    }

    pub fn sweep(&self) -> Option<DoorSweep> {
        self.sweep
    }

    pub fn is_door(&self) -> bool {
        self.opening_type.is_door()
    }

    pub fn reference_offset_ratio(&self) -> f64 {
        self.reference_offset_ratio
    }

    /// Sets the offset ratio and drops the memoized reference geometry.
    pub(crate) fn set_reference_offset_ratio(&mut self, ratio: f64) {
        if ratio != self.reference_offset_ratio {
            self.reference_offset_ratio = ratio;
            self.reference = OnceCell::new();
        }
    }

    /// Opening rectangle in the frame of the host reference line, pushed
    /// out across the line so it reaches into the areas on both sides.
    pub fn reference_geometry(&self) -> &Polygon<f64> {
        self.reference
            .get_or_init(|| self.compute_reference_geometry(self.reference_offset_ratio))
    }

    fn compute_reference_geometry(&self, offset_ratio: f64) -> Polygon<f64> {
        let rect = self.footprint().minimum_rotated_rect();
        let (Some(rect), Some(dir)) = (rect, unit_direction(&self.separator_reference_line))
        else {
            return self.footprint().polygons()[0].clone();
        };
        let frame = Frame::along(self.separator_reference_line.start, dir);
        match frame.extent(rect.exterior().0.iter()) {
            Some((t, (s_min, s_max))) => {
                let offset = (s_max - s_min) * offset_ratio;
                frame.rectangle(t, (s_min - offset, s_max + offset))
            }
            None => rect,
        }
    }

    /// Re-homes this opening onto another separator, re-deriving the
    /// polygon so it spans that separator's full width.
    pub fn adjusted_to(&self, separator: &Separator) -> Result<Self> {
        let polygon = adjust_geometry_to_wall(self, separator, None)?;
        let footprint = Footprint::repaired(&polygon)
            .map_err(|e| Error::invalid_shape(self.id().to_string(), e.to_string()))?;
        let mut entity = SpatialEntity::with_footprint(self.id(), footprint, self.height());
        entity.set_angle(self.entity.angle());
        entity.set_direction(self.entity.direction());
        let mut adjusted = Self::from_entity(
            entity,
            self.opening_type,
            separator.id().to_string(),
            separator.reference_line()?,
        );
        adjusted.sub_type = self.sub_type;
        adjusted.sweep = self.sweep;
        adjusted.reference_offset_ratio = self.reference_offset_ratio;
        Ok(adjusted)
    }

    pub(crate) fn to_relative(&mut self, parent_position: Point<f64>) -> Result<()> {
        let centroid = self.entity.centroid()?;
        self.entity.footprint_absolute_to_relative(parent_position)?;
        let shift = |c: Coord<f64>| Coord {
            x: c.x - centroid.x(),
            y: c.y - centroid.y(),
        };
        let line = self.separator_reference_line;
        self.separator_reference_line = Line::new(shift(line.start), shift(line.end));
        self.sweep = self
            .sweep
            .map(|s| s.map(|p| Point::new(p.x() - centroid.x(), p.y() - centroid.y())));
        self.reference = OnceCell::new();
        Ok(())
    }

    pub(crate) fn apply_georeference(&mut self, transform: &dyn GeoreferenceTransform) -> Result<()> {
        self.entity.apply_georeference(transform)?;
        let map = |c: Coord<f64>| transform.apply_to_point(Point::from(c)).0;
        let line = self.separator_reference_line;
        self.separator_reference_line = Line::new(map(line.start), map(line.end));
        self.sweep = self.sweep.map(|s| s.map(|p| transform.apply_to_point(p)));
        self.reference = OnceCell::new();
        Ok(())
    }
}

/// Opening polygon re-derived to cross `wall` completely.
///
/// The along-wall extent comes from the opening, the across-wall extent
/// from the wall's rotated rectangle. With `buffer_width` the across-wall
/// extent is scaled by that factor about the wall's centre line.
pub fn adjust_geometry_to_wall(
    opening: &Opening,
    wall: &Separator,
    buffer_width: Option<f64>,
) -> Result<Polygon<f64>> {
    let sides = RectSides::of(wall.footprint())
        .ok_or_else(|| Error::invalid_shape(wall.id().to_string(), "wall has no rotated rectangle"))?;
    let wall_frame = frame_of(wall, &sides.centre_line())?;
    let (_, (s_min, s_max)) = wall_frame
        .extent(sides.short.iter().flat_map(|l| [&l.start, &l.end]))
        .ok_or_else(|| Error::invalid_shape(wall.id().to_string(), "wall has no extent"))?;
    let factor = buffer_width.unwrap_or(1.0);
    let (mid, half) = ((s_min + s_max) / 2.0, (s_max - s_min) / 2.0 * factor);
    opening_rectangle(opening, &wall_frame, (mid - half, mid + half))
}

fn frame_of(wall: &Separator, centre: &Line<f64>) -> Result<Frame> {
    let dir = unit_direction(centre)
        .ok_or_else(|| Error::invalid_shape(wall.id().to_string(), "wall has no length"))?;
    Ok(Frame::along(centre.start, dir))
}

fn opening_rectangle(opening: &Opening, frame: &Frame, across: (f64, f64)) -> Result<Polygon<f64>> {
    let rect = opening.footprint().minimum_rotated_rect().ok_or_else(|| {
        Error::invalid_shape(opening.id().to_string(), "opening has no rotated rectangle")
    })?;
    let (along, _) = frame
        .extent(rect.exterior().0.iter())
        .ok_or_else(|| Error::invalid_shape(opening.id().to_string(), "opening has no extent"))?;
    Ok(frame.rectangle(along, across))
}

impl Spatial for Opening {
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
    use crate::types::SeparatorType;
    use approx::assert_relative_eq;
    use floorplan_geometry::rectangle;
    use geo::{Area, BoundingRect};

    fn wall() -> Separator {
        Separator::new(
            "w",
            SeparatorType::Wall,
            &rectangle(0.0, 4.0, 6.0, 4.2),
            Height::default(),
        )
        .unwrap()
    }

    #[test]
    fn reference_geometry_extends_across_the_wall() {
        let wall = wall();
        let door = Opening::new(
            "d",
            OpeningType::Door,
            &rectangle(2.0, 4.0, 3.0, 4.2),
            Height::new(0.0, 2.1).unwrap(),
            &wall,
        )
        .unwrap();
        let reference = door.reference_geometry();
        let bbox = reference.bounding_rect().unwrap();
        assert_relative_eq!(bbox.min().y, 3.98, epsilon = 1e-9);
        assert_relative_eq!(bbox.max().y, 4.22, epsilon = 1e-9);
        assert_relative_eq!(bbox.width(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn new_offset_ratio_replaces_memoized_reference() {
        let wall = wall();
        let mut door = Opening::new(
            "d",
            OpeningType::Door,
            &rectangle(2.0, 4.0, 3.0, 4.2),
            Height::new(0.0, 2.1).unwrap(),
            &wall,
        )
        .unwrap();
        let bbox = door.reference_geometry().bounding_rect().unwrap();
        assert_relative_eq!(bbox.height(), 0.24, epsilon = 1e-9);

        door.set_reference_offset_ratio(0.5);
        let bbox = door.reference_geometry().bounding_rect().unwrap();
        assert_relative_eq!(bbox.min().y, 3.9, epsilon = 1e-9);
        assert_relative_eq!(bbox.max().y, 4.3, epsilon = 1e-9);

        let moved = door.adjusted_to(&wall).unwrap();
        assert_relative_eq!(moved.reference_offset_ratio(), 0.5);
    }

    #[test]
    fn thin_opening_is_stretched_to_wall_width() {
        let wall = wall();
        let window = Opening::new(
            "win",
            OpeningType::Window,
            &rectangle(1.0, 4.05, 2.5, 4.1),
            Height::new(0.9, 2.1).unwrap(),
            &wall,
        )
        .unwrap();
        let adjusted = adjust_geometry_to_wall(&window, &wall, None).unwrap();
        assert_relative_eq!(adjusted.unsigned_area(), 1.5 * 0.2, epsilon = 1e-9);

        let widened = adjust_geometry_to_wall(&window, &wall, Some(2.0)).unwrap();
        assert_relative_eq!(widened.unsigned_area(), 1.5 * 0.4, epsilon = 1e-9);
    }

    #[test]
    fn relative_conversion_moves_reference_line() {
        let wall = wall();
        let mut door = Opening::new(
            "d",
            OpeningType::Door,
            &rectangle(2.0, 4.0, 3.0, 4.2),
            Height::default(),
            &wall,
        )
        .unwrap();
        door.to_relative(Point::new(0.0, 0.0)).unwrap();
        let line = door.separator_reference_line();
        assert_relative_eq!(line.start.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(door.entity().position().x(), 2.5, epsilon = 1e-9);
    }
}

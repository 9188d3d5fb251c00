// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base spatial entity shared by every floor plan element.
//!
//! A [`SpatialEntity`] carries a repaired footprint, a height interval and a
//! parent-relative placement. Concrete entities (areas, features, openings,
//! separators, spaces) embed one and expose it through the [`Spatial`] trait.

use std::cell::OnceCell;

use floorplan_geometry::{rect, Footprint, GeoreferenceTransform};
use geo::{Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of an entity, unique within a layout.
pub type EntityId = String;

/// Vertical extent of an entity, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Height {
    lower: f64,
    upper: f64,
}

impl Height {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower <= upper) {
            return Err(Error::InvalidHeight { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Default for Height {
    /// One default storey: floor to ceiling.
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 2.6,
        }
    }
}

/// Footprint, height and placement of an entity.
#[derive(Debug, Clone)]
pub struct SpatialEntity {
    id: EntityId,
    footprint: Footprint,
    height: Height,
    position: Point<f64>,
    /// Degrees, counter-clockwise.
    angle: f64,
    direction: Option<f64>,
    // (width, length) of the minimum rotated rectangle
    dimensions: OnceCell<(f64, f64)>,
}

impl SpatialEntity {
    /// Creates an entity from a raw polygon, repairing it first.
    pub fn new(id: impl Into<EntityId>, polygon: &Polygon<f64>, height: Height) -> Result<Self> {
        let id = id.into();
        let footprint = Footprint::repaired(polygon)
            .map_err(|e| Error::invalid_shape(id.clone(), e.to_string()))?;
        Ok(Self::with_footprint(id, footprint, height))
    }

    /// Creates an entity from a footprint that is already valid.
    pub fn with_footprint(id: impl Into<EntityId>, footprint: Footprint, height: Height) -> Self {
        Self {
            id: id.into(),
            footprint,
            height,
            position: Point::new(0.0, 0.0),
            angle: 0.0,
            direction: None,
            dimensions: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn position(&self) -> Point<f64> {
        self.position
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn direction(&self) -> Option<f64> {
        self.direction
    }

    pub fn set_position(&mut self, position: Point<f64>) {
        self.position = position;
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }

    pub fn set_direction(&mut self, direction: Option<f64>) {
        self.direction = direction;
    }

    pub(crate) fn replace_footprint(&mut self, footprint: Footprint) {
        self.footprint = footprint;
        self.dimensions = OnceCell::new();
    }

    pub fn centroid(&self) -> Result<Point<f64>> {
        self.footprint
            .centroid()
            .ok_or_else(|| Error::invalid_shape(self.id.clone(), "footprint has no centroid"))
    }

    /// Moves the entity into coordinates relative to `parent_position`.
    ///
    /// The position becomes the centroid offset from the parent and the
    /// footprint is re-expressed around its own centroid, which ends up at
    /// the origin.
    pub fn footprint_absolute_to_relative(&mut self, parent_position: Point<f64>) -> Result<()> {
        let centroid = self.centroid()?;
        self.position = Point::new(
            centroid.x() - parent_position.x(),
            centroid.y() - parent_position.y(),
        );
        self.footprint = self.footprint.translated(-centroid.x(), -centroid.y());
        Ok(())
    }

    /// Maps position and footprint through a georeferencing transform.
    ///
    /// Fails if a single polygon comes out as several disconnected parts.
    pub fn apply_georeference(&mut self, transform: &dyn GeoreferenceTransform) -> Result<()> {
        let mapped = transform.apply_to_footprint(&self.footprint);
        let repaired = match &mapped {
            Footprint::Polygon(p) => Footprint::repaired(p),
            Footprint::MultiPolygon(mp) => Footprint::repaired_multi(mp),
        }
        .map_err(|e| Error::invalid_shape(self.id.clone(), e.to_string()))?;
        if self.footprint.is_single() && !repaired.is_single() {
            return Err(Error::invalid_shape(
                self.id.clone(),
                format!(
                    "georeferencing split a polygon into {} parts",
                    repaired.part_count()
                ),
            ));
        }
        self.footprint = repaired;
        self.position = transform.apply_to_point(self.position);
        self.angle += transform.rotation_angle();
        self.dimensions = OnceCell::new();
        Ok(())
    }

    fn dimensions(&self) -> (f64, f64) {
        *self
            .dimensions
            .get_or_init(|| rect::width_and_length(&self.footprint))
    }

    /// Shorter side of the minimum rotated rectangle.
    pub fn width(&self) -> f64 {
        self.dimensions().0
    }

    /// Longer side of the minimum rotated rectangle.
    pub fn length(&self) -> f64 {
        self.dimensions().1
    }

    /// Vertical cladding area of the longer side.
    pub fn surface_area(&self) -> f64 {
        self.height.span() * self.length()
    }
}

/// Access to the embedded [`SpatialEntity`].
pub trait Spatial {
    fn entity(&self) -> &SpatialEntity;

    fn entity_mut(&mut self) -> &mut SpatialEntity;

    fn id(&self) -> &str {
        self.entity().id()
    }

    fn footprint(&self) -> &Footprint {
        self.entity().footprint()
    }

    fn height(&self) -> Height {
        self.entity().height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorplan_geometry::{rectangle, AffineGeoreference};
    use geo::{Coord, LineString};

    fn wall() -> SpatialEntity {
        SpatialEntity::new("w", &rectangle(2.0, 2.0, 6.0, 2.5), Height::new(0.0, 2.5).unwrap())
            .unwrap()
    }

    #[test]
    fn height_must_be_ordered() {
        assert!(Height::new(0.0, 2.6).is_ok());
        assert!(matches!(
            Height::new(3.0, 1.0),
            Err(Error::InvalidHeight { .. })
        ));
    }

    #[test]
    fn width_length_and_surface() {
        let e = wall();
        assert_relative_eq!(e.width(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(e.length(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(e.surface_area(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn relative_footprint_is_centred() {
        let mut e = wall();
        e.footprint_absolute_to_relative(Point::new(1.0, 1.0)).unwrap();
        let c = e.footprint().centroid().unwrap();
        assert_relative_eq!(c.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(c.y(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(e.position().x(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(e.position().y(), 1.25, epsilon = 1e-9);
    }

    #[test]
    fn self_intersecting_input_is_repaired() {
        let bowtie = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]),
            vec![],
        );
        let e = SpatialEntity::new("b", &bowtie, Height::default()).unwrap();
        assert_relative_eq!(e.footprint().area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn georeference_moves_and_rotates() {
        let mut e = wall();
        let t = AffineGeoreference::new(Coord { x: 0.0, y: 0.0 }, 1.0, 90.0, Coord { x: 10.0, y: 0.0 });
        e.apply_georeference(&t).unwrap();
        assert_relative_eq!(e.angle(), 90.0);
        assert_relative_eq!(e.footprint().area(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(e.length(), 4.0, epsilon = 1e-9);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placed fixtures and their orientation.
//!
//! A feature's 3D placement (axes, scales, translation) is consumed by mesh
//! exporters. When no explicit angle was annotated, the axes are inferred
//! from the wall the feature stands against: wall-mounted types declare
//! which of their sides (short or long) faces the wall.

use std::collections::BTreeMap;

use floorplan_geometry::rect::{midpoint, unit_direction};
use floorplan_geometry::{GeometryTolerances, GeoreferenceTransform, RectSides};
use geo::{Coord, EuclideanDistance, EuclideanLength, Intersects, Line, LineString, Point, Polygon};
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::entity::{EntityId, Height, Spatial, SpatialEntity};
use crate::error::{Error, Result};
use crate::separator::Separator;
use crate::types::{FeatureType, ParametricalGeometry, WallSide};

/// A fixture placed inside an area.
#[derive(Debug, Clone)]
pub struct Feature {
    entity: SpatialEntity,
    feature_type: FeatureType,
    /// Half-width and half-length of the placement rectangle.
    dim: Option<(f64, f64)>,
    /// Annotated rotation in degrees; `None` leaves the axes to the walls.
    explicit_angle: Option<f64>,
    parametrical_geometry: Option<ParametricalGeometry>,
    tags: BTreeMap<String, String>,
}

/// Axes, scales and translation of a feature in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Columns are the local x, y and z axes.
    pub axes: Matrix3<f64>,
    pub scales: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl Feature {
    pub fn new(
        id: impl Into<EntityId>,
        feature_type: FeatureType,
        polygon: &Polygon<f64>,
        height: Height,
    ) -> Result<Self> {
        Ok(Self {
            entity: SpatialEntity::new(id, polygon, height)?,
            feature_type,
            dim: None,
            explicit_angle: None,
            parametrical_geometry: None,
            tags: BTreeMap::new(),
        })
    }

    /// Places a rectangle of `2 * dim` centred on `centre`, rotated by
    /// `angle` degrees.
    pub fn placed(
        id: impl Into<EntityId>,
        feature_type: FeatureType,
        centre: Point<f64>,
        dim: (f64, f64),
        angle: f64,
        height: Height,
    ) -> Result<Self> {
        let (sin, cos) = angle.to_radians().sin_cos();
        let corner = |x: f64, y: f64| Coord {
            x: centre.x() + x * cos - y * sin,
            y: centre.y() + x * sin + y * cos,
        };
        let (hw, hl) = dim;
        let polygon = Polygon::new(
            LineString::new(vec![
                corner(-hw, -hl),
                corner(hw, -hl),
                corner(hw, hl),
                corner(-hw, hl),
            ]),
            vec![],
        );
        let mut feature = Self::new(id, feature_type, &polygon, height)?;
        feature.dim = Some(dim);
        feature.parametrical_geometry = Some(ParametricalGeometry::Rectangular);
        Ok(feature.with_angle(angle))
    }

    /// Annotates the rotation in degrees. Any value, `0.0` included, takes
    /// precedence over wall inference.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.entity.set_angle(angle);
        self.explicit_angle = Some(angle);
        self
    }

    pub fn explicit_angle(&self) -> Option<f64> {
        self.explicit_angle
    }

    pub fn with_parametrical_geometry(mut self, hint: ParametricalGeometry) -> Self {
        self.parametrical_geometry = Some(hint);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn dim(&self) -> Option<(f64, f64)> {
        self.dim
    }

    pub fn parametrical_geometry(&self) -> Option<ParametricalGeometry> {
        self.parametrical_geometry
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Axes, scales and translation used to place the feature's mesh.
    ///
    /// An annotated angle wins; otherwise the axes follow the wall the
    /// feature stands against.
    pub fn axes_scales_translation(
        &self,
        walls: &[&Separator],
        altitude: f64,
        tolerances: &GeometryTolerances,
    ) -> Result<Placement> {
        let centroid = self.entity.centroid()?;
        let height = self.entity.height();
        let translation = Vector3::new(centroid.x(), centroid.y(), altitude + height.lower());

        if let Some(angle) = self.explicit_angle {
            let rotation =
                Rotation3::from_axis_angle(&Vector3::z_axis(), (angle + 180.0).to_radians());
            let (w, l) = match self.dim {
                Some((hw, hl)) => (2.0 * hw, 2.0 * hl),
                None => (self.entity.width(), self.entity.length()),
            };
            return Ok(Placement {
                axes: *rotation.matrix(),
                scales: Vector3::new(w, l, height.span()),
                translation,
            });
        }

        let (axes, scales) = self.legacy_axes(walls, tolerances)?;
        Ok(Placement {
            axes,
            scales,
            translation,
        })
    }

    fn legacy_axes(
        &self,
        walls: &[&Separator],
        tolerances: &GeometryTolerances,
    ) -> Result<(Matrix3<f64>, Vector3<f64>)> {
        let (intersecting, orthogonal) =
            self.get_intersecting_and_orthogonal_side_from_walls(walls, tolerances)?;
        let (Some(u), Some(v)) = (unit_direction(&intersecting), unit_direction(&orthogonal))
        else {
            return Err(Error::FeaturesGeneration(format!(
                "feature {} has a degenerate footprint",
                self.id()
            )));
        };
        let mut x = Vector3::new(u.x, u.y, 0.0);
        let y = Vector3::new(v.x, v.y, 0.0);
        let z = Vector3::z();
        if x.cross(&y).z < 0.0 {
            x = -x;
        }
        Ok((
            Matrix3::from_columns(&[x, y, z]),
            Vector3::new(
                intersecting.euclidean_length(),
                orthogonal.euclidean_length(),
                self.entity.height().span(),
            ),
        ))
    }

    /// Side standing against a wall, and the adjacent side pointing away
    /// from it.
    ///
    /// Each candidate side (short or long, per feature type) is projected
    /// away from the centroid by its homothetic image. A wall qualifies when
    /// one of its own short sides crosses that projection; the wall closest
    /// to a candidate side decides, and on equal distance a wall parallel to
    /// the side wins over a perpendicular one.
    pub fn get_intersecting_and_orthogonal_side_from_walls(
        &self,
        walls: &[&Separator],
        tolerances: &GeometryTolerances,
    ) -> Result<(Line<f64>, Line<f64>)> {
        let sides = RectSides::of(self.footprint()).ok_or_else(|| {
            Error::FeaturesGeneration(format!("feature {} has no rotated rectangle", self.id()))
        })?;
        let centroid = self.entity.centroid()?;

        let Some(expected) = self.feature_type.expected_wall_side() else {
            let intersecting = sides.long[0];
            return Ok((intersecting, away_from(&sides.short[0], &intersecting)));
        };

        let (candidates, others) = match expected {
            WallSide::Short => (sides.short, sides.long),
            WallSide::Long => (sides.long, sides.short),
        };

        let mut best: Option<(f64, bool, usize)> = None;
        for (i, side) in candidates.iter().enumerate() {
            let projection = projection_polygon(side, centroid, tolerances.feature_projection_scale);
            for wall in walls {
                let Some(wall_sides) = RectSides::of(wall.footprint()) else {
                    continue;
                };
                if !wall_sides.short.iter().any(|s| projection.intersects(s)) {
                    continue;
                }
                let distance = wall
                    .footprint()
                    .polygons()
                    .iter()
                    .map(|p| side.euclidean_distance(p))
                    .fold(f64::INFINITY, f64::min);
                let parallel = is_parallel(&wall_sides.long[0], side);
                let better = match best {
                    None => true,
                    Some((d, p, _)) => {
                        distance < d - DISTANCE_TIE
                            || (distance <= d + DISTANCE_TIE && parallel && !p)
                    }
                };
                if better {
                    best = Some((distance, parallel, i));
                }
            }
        }

        let (_, _, i) = best.ok_or_else(|| Error::AngleInference(self.id().to_string()))?;
        let intersecting = candidates[i];
        Ok((intersecting, away_from(&others[0], &intersecting)))
    }

    pub(crate) fn apply_georeference(&mut self, transform: &dyn GeoreferenceTransform) -> Result<()> {
        self.entity.apply_georeference(transform)?;
        self.explicit_angle = self.explicit_angle.map(|a| a + transform.rotation_angle());
        Ok(())
    }
}

/// Wall distances closer than this count as equal.
const DISTANCE_TIE: f64 = 1e-9;

/// Quadrilateral between a side and its image scaled about `centre`.
fn projection_polygon(side: &Line<f64>, centre: Point<f64>, scale: f64) -> Polygon<f64> {
    let scaled = |c: Coord<f64>| Coord {
        x: centre.x() + (c.x - centre.x()) * scale,
        y: centre.y() + (c.y - centre.y()) * scale,
    };
    Polygon::new(
        LineString::new(vec![side.start, side.end, scaled(side.end), scaled(side.start)]),
        vec![],
    )
}

fn is_parallel(a: &Line<f64>, b: &Line<f64>) -> bool {
    match (unit_direction(a), unit_direction(b)) {
        (Some(u), Some(v)) => (u.x * v.y - u.y * v.x).abs() < 1e-6,
        _ => false,
    }
}

/// Orients `line` so that it starts at the end nearest to `from`.
fn away_from(line: &Line<f64>, from: &Line<f64>) -> Line<f64> {
    let anchor = Point::from(midpoint(from));
    let d_start = Point::from(line.start).euclidean_distance(&anchor);
    let d_end = Point::from(line.end).euclidean_distance(&anchor);
    if d_start <= d_end {
        *line
    } else {
        Line::new(line.end, line.start)
    }
}

impl Spatial for Feature {
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

    fn wall(id: &str, polygon: Polygon<f64>) -> Separator {
        Separator::new(id, SeparatorType::Wall, &polygon, Height::default()).unwrap()
    }

    /// Wall stub whose ends lie within reach of a 1 m sink's projection.
    fn wall_behind_sink() -> Separator {
        wall("wall", rectangle(0.7, 2.0, 2.3, 2.2))
    }

    #[test]
    fn placed_feature_has_rotated_rectangle() {
        let f = Feature::placed(
            "f",
            FeatureType::Bathtub,
            Point::new(1.0, 1.0),
            (0.4, 0.9),
            90.0,
            Height::default(),
        )
        .unwrap();
        assert_relative_eq!(f.footprint().area(), 0.8 * 1.8, epsilon = 1e-9);
        assert_relative_eq!(f.entity().width(), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn sink_long_side_faces_wall() {
        let sink = Feature::new(
            "sink",
            FeatureType::Sink,
            &rectangle(1.0, 1.5, 2.0, 2.0),
            Height::default(),
        )
        .unwrap();
        let wall = wall_behind_sink();
        let (intersecting, orthogonal) = sink
            .get_intersecting_and_orthogonal_side_from_walls(&[&wall], &GeometryTolerances::default())
            .unwrap();
        // the long side at y = 2.0 touches the wall
        assert_relative_eq!(intersecting.start.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(intersecting.end.y, 2.0, epsilon = 1e-9);
        // orthogonal side runs from the wall into the room
        assert!(orthogonal.end.y < orthogonal.start.y);
    }

    #[test]
    fn wall_reached_only_by_its_long_face_does_not_qualify() {
        let sink = Feature::new(
            "sink",
            FeatureType::Sink,
            &rectangle(1.0, 1.5, 2.0, 2.0),
            Height::default(),
        )
        .unwrap();
        // both ends of this wall are far beyond the sink's projection
        let long = wall("long", rectangle(-10.0, 2.0, 14.0, 2.2));
        let err = sink
            .get_intersecting_and_orthogonal_side_from_walls(&[&long], &GeometryTolerances::default())
            .unwrap_err();
        assert!(matches!(err, Error::AngleInference(id) if id == "sink"));
    }

    #[test]
    fn corner_sink_faces_the_parallel_wall() {
        let sink = Feature::new(
            "sink",
            FeatureType::Sink,
            &rectangle(0.0, 0.0, 1.0, 0.5),
            Height::default(),
        )
        .unwrap();
        // `under` runs along the long side at y = 0, `beside` closes the corner at x = 0
        let under = wall("under", rectangle(-0.2, -0.2, 2.0, 0.0));
        let beside = wall("beside", rectangle(-0.2, -0.2, 0.0, 1.0));
        for walls in [[&beside, &under], [&under, &beside]] {
            let (intersecting, orthogonal) = sink
                .get_intersecting_and_orthogonal_side_from_walls(&walls, &GeometryTolerances::default())
                .unwrap();
            assert_relative_eq!(intersecting.start.y, 0.0, epsilon = 1e-9);
            assert_relative_eq!(intersecting.end.y, 0.0, epsilon = 1e-9);
            assert!(orthogonal.end.y > orthogonal.start.y);
        }
    }

    #[test]
    fn missing_wall_is_an_angle_inference_error() {
        let toilet = Feature::new(
            "wc",
            FeatureType::Toilet,
            &rectangle(10.0, 10.0, 10.4, 10.7),
            Height::default(),
        )
        .unwrap();
        let wall = wall_behind_sink();
        let err = toilet
            .get_intersecting_and_orthogonal_side_from_walls(&[&wall], &GeometryTolerances::default())
            .unwrap_err();
        assert!(matches!(err, Error::AngleInference(id) if id == "wc"));
    }

    #[test]
    fn explicit_angle_drives_axes() {
        let f = Feature::new(
            "k",
            FeatureType::Kitchen,
            &rectangle(0.0, 0.0, 2.0, 0.6),
            Height::new(0.0, 0.9).unwrap(),
        )
        .unwrap()
        .with_angle(90.0);
        let placement = f
            .axes_scales_translation(&[], 3.0, &GeometryTolerances::default())
            .unwrap();
        // rotation by 270 degrees maps x onto -y
        assert_relative_eq!(placement.axes[(0, 0)], 0.0, epsilon = 1e-9);
        assert_relative_eq!(placement.axes[(1, 0)], -1.0, epsilon = 1e-9);
        assert_relative_eq!(placement.translation.z, 3.0);
        assert_relative_eq!(placement.scales.z, 0.9);
    }

    #[test]
    fn zero_angle_annotation_skips_wall_inference() {
        let f = Feature::new(
            "wc",
            FeatureType::Toilet,
            &rectangle(10.0, 10.0, 10.4, 10.7),
            Height::default(),
        )
        .unwrap()
        .with_angle(0.0);
        assert_eq!(f.explicit_angle(), Some(0.0));
        // no walls at all: inference would fail, the annotation does not
        let placement = f
            .axes_scales_translation(&[], 0.0, &GeometryTolerances::default())
            .unwrap();
        assert_relative_eq!(placement.axes[(0, 0)], -1.0, epsilon = 1e-9);
        assert_relative_eq!(placement.axes[(1, 1)], -1.0, epsilon = 1e-9);

        let plain = Feature::new(
            "wc2",
            FeatureType::Toilet,
            &rectangle(10.0, 10.0, 10.4, 10.7),
            Height::default(),
        )
        .unwrap();
        assert_eq!(plain.explicit_angle(), None);
        assert!(matches!(
            plain.axes_scales_translation(&[], 0.0, &GeometryTolerances::default()),
            Err(Error::AngleInference(_))
        ));
    }

    #[test]
    fn georeferencing_rotates_the_annotated_angle() {
        let mut f = Feature::new(
            "k",
            FeatureType::Kitchen,
            &rectangle(0.0, 0.0, 2.0, 0.6),
            Height::default(),
        )
        .unwrap()
        .with_angle(0.0);
        let origin = Coord { x: 0.0, y: 0.0 };
        let transform = floorplan_geometry::AffineGeoreference::new(origin, 1.0, 90.0, origin);
        f.apply_georeference(&transform).unwrap();
        assert_relative_eq!(f.explicit_angle().unwrap(), 90.0);
        assert_relative_eq!(f.entity().angle(), 90.0);
    }

    #[test]
    fn inferred_axes_are_right_handed() {
        let sink = Feature::new(
            "sink",
            FeatureType::Sink,
            &rectangle(1.0, 1.5, 2.0, 2.0),
            Height::default(),
        )
        .unwrap();
        let wall = wall_behind_sink();
        let placement = sink
            .axes_scales_translation(&[&wall], 0.0, &GeometryTolerances::default())
            .unwrap();
        let x = placement.axes.column(0).into_owned();
        let y = placement.axes.column(1).into_owned();
        assert_relative_eq!(x.cross(&y).z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(placement.scales.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(placement.scales.y, 0.5, epsilon = 1e-9);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Georeferencing transforms.
//!
//! A georeferencing transform maps a plan's local coordinates onto real-world
//! coordinates. It is supplied from outside (the mesh/export side owns the
//! actual reference), so the footprint algebra only depends on the
//! [`GeoreferenceTransform`] trait.

use geo::{AffineOps, AffineTransform, Coord, Point, Polygon};

use crate::footprint::Footprint;

/// Maps local plan geometry onto a reference frame.
pub trait GeoreferenceTransform {
    fn apply_to_point(&self, point: Point<f64>) -> Point<f64>;

    fn apply_to_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64>;

    /// Rotation applied by the transform, in degrees.
    fn rotation_angle(&self) -> f64;

    fn scale_factor(&self) -> f64;

    /// Applies the transform to every part, keeping the variant.
    fn apply_to_footprint(&self, footprint: &Footprint) -> Footprint {
        match footprint {
            Footprint::Polygon(p) => Footprint::Polygon(self.apply_to_polygon(p)),
            Footprint::MultiPolygon(mp) => Footprint::MultiPolygon(
                mp.0.iter().map(|p| self.apply_to_polygon(p)).collect(),
            ),
        }
    }
}

/// Similarity transform: scale and rotate about a pivot, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineGeoreference {
    affine: AffineTransform<f64>,
    rotation_angle: f64,
    scale_factor: f64,
}

impl AffineGeoreference {
    /// `rotation_angle` is in degrees, counter-clockwise.
    pub fn new(pivot: Coord<f64>, scale_factor: f64, rotation_angle: f64, translation: Coord<f64>) -> Self {
        let (sin, cos) = rotation_angle.to_radians().sin_cos();
        let (a, b) = (scale_factor * cos, -scale_factor * sin);
        let (d, e) = (scale_factor * sin, scale_factor * cos);
        let affine = AffineTransform::new(
            a,
            b,
            pivot.x - a * pivot.x - b * pivot.y + translation.x,
            d,
            e,
            pivot.y - d * pivot.x - e * pivot.y + translation.y,
        );
        Self {
            affine,
            rotation_angle,
            scale_factor,
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(Coord { x: 0.0, y: 0.0 }, 1.0, 0.0, Coord { x: dx, y: dy })
    }
}

impl GeoreferenceTransform for AffineGeoreference {
    fn apply_to_point(&self, point: Point<f64>) -> Point<f64> {
        Point::from(self.affine.apply(point.0))
    }

    fn apply_to_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        polygon.affine_transform(&self.affine)
    }

    fn rotation_angle(&self) -> f64 {
        self.rotation_angle
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::rectangle;
    use approx::assert_relative_eq;
    use geo::Area;

    #[test]
    fn translation_moves_points() {
        let t = AffineGeoreference::translation(10.0, -5.0);
        let p = t.apply_to_point(Point::new(1.0, 1.0));
        assert_relative_eq!(p.x(), 11.0);
        assert_relative_eq!(p.y(), -4.0);
    }

    #[test]
    fn rotation_about_pivot() {
        let t = AffineGeoreference::new(Coord { x: 0.0, y: 0.0 }, 1.0, 90.0, Coord { x: 0.0, y: 0.0 });
        let p = t.apply_to_point(Point::new(1.0, 0.0));
        assert_relative_eq!(p.x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.rotation_angle(), 90.0);
    }

    #[test]
    fn scaling_scales_area() {
        let t = AffineGeoreference::new(Coord { x: 0.0, y: 0.0 }, 2.0, 0.0, Coord { x: 0.0, y: 0.0 });
        let fp = t.apply_to_footprint(&Footprint::from(rectangle(0.0, 0.0, 1.0, 1.0)));
        assert!(fp.is_single());
        assert_relative_eq!(fp.area(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(
            t.apply_to_polygon(&rectangle(0.0, 0.0, 1.0, 2.0)).unsigned_area(),
            8.0,
            epsilon = 1e-12
        );
    }
}

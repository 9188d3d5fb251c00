// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The 2D outline of a floor plan entity.

use geo::orient::{Direction, Orient};
use geo::{
    Area, BoundingRect, Centroid, Coord, EuclideanLength, MapCoords, MinimumRotatedRect,
    MultiPolygon, Point, Polygon, Rect, Translate,
};

use crate::bool2d;
use crate::error::{Error, Result};

/// A polygon or multi-polygon outline.
///
/// Footprints built through [`Footprint::repaired`] are always valid: rings
/// are closed, consistently oriented and free of self-intersections.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Footprint {
    /// Repairs an arbitrary polygon into a valid footprint.
    ///
    /// A polygon with a simple exterior ring and no holes is kept as given,
    /// only reoriented. Anything else goes through the overlay engine; a
    /// self-intersecting ring can split into several parts and the result is
    /// then a multi-polygon. Fails if nothing with positive area survives.
    pub fn repaired(polygon: &Polygon<f64>) -> Result<Self> {
        if bool2d::is_simple_ring_polygon(polygon) {
            return Ok(Footprint::Polygon(polygon.orient(Direction::Default)));
        }
        let valid = bool2d::make_valid(polygon);
        if valid.0.is_empty() {
            return Err(Error::EmptyGeometry(
                "polygon has no area after repair".to_string(),
            ));
        }
        Ok(Self::from_multi(valid))
    }

    /// Repairs every part of a multi-polygon, unioning overlapping parts.
    pub fn repaired_multi(multi: &MultiPolygon<f64>) -> Result<Self> {
        let valid = bool2d::union_all(multi.0.iter());
        if valid.0.is_empty() {
            return Err(Error::EmptyGeometry(
                "multi-polygon has no area after repair".to_string(),
            ));
        }
        Ok(Self::from_multi(valid))
    }

    /// Wraps a multi-polygon, collapsing it to a polygon when it has one part.
    pub fn from_multi(mut multi: MultiPolygon<f64>) -> Self {
        if multi.0.len() == 1 {
            Footprint::Polygon(multi.0.remove(0))
        } else {
            Footprint::MultiPolygon(multi)
        }
    }

    /// The parts of this footprint.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Footprint::Polygon(p) => std::slice::from_ref(p),
            Footprint::MultiPolygon(mp) => &mp.0,
        }
    }

    pub fn to_multi(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.polygons().to_vec())
    }

    pub fn into_multi(self) -> MultiPolygon<f64> {
        match self {
            Footprint::Polygon(p) => MultiPolygon::new(vec![p]),
            Footprint::MultiPolygon(mp) => mp,
        }
    }

    /// `true` for the single-polygon variant.
    pub fn is_single(&self) -> bool {
        matches!(self, Footprint::Polygon(_))
    }

    pub fn is_empty(&self) -> bool {
        self.polygons().is_empty()
    }

    pub fn part_count(&self) -> usize {
        self.polygons().len()
    }

    pub fn area(&self) -> f64 {
        match self {
            Footprint::Polygon(p) => p.unsigned_area(),
            Footprint::MultiPolygon(mp) => mp.unsigned_area(),
        }
    }

    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Footprint::Polygon(p) => p.centroid(),
            Footprint::MultiPolygon(mp) => mp.centroid(),
        }
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Footprint::Polygon(p) => p.bounding_rect(),
            Footprint::MultiPolygon(mp) => mp.bounding_rect(),
        }
    }

    /// Minimum-area rotated rectangle enclosing all parts.
    pub fn minimum_rotated_rect(&self) -> Option<Polygon<f64>> {
        match self {
            Footprint::Polygon(p) => p.minimum_rotated_rect(),
            Footprint::MultiPolygon(mp) => mp.minimum_rotated_rect(),
        }
    }

    /// Total length of all exterior rings.
    pub fn exterior_length(&self) -> f64 {
        self.polygons()
            .iter()
            .map(|p| p.exterior().euclidean_length())
            .sum()
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        match self {
            Footprint::Polygon(p) => Footprint::Polygon(p.translate(dx, dy)),
            Footprint::MultiPolygon(mp) => Footprint::MultiPolygon(mp.translate(dx, dy)),
        }
    }

    /// Applies `f` to every coordinate, keeping the variant.
    pub fn map_coords(&self, f: impl Fn(Coord<f64>) -> Coord<f64> + Copy) -> Self {
        match self {
            Footprint::Polygon(p) => Footprint::Polygon(p.map_coords(f)),
            Footprint::MultiPolygon(mp) => Footprint::MultiPolygon(mp.map_coords(f)),
        }
    }

    /// `true` when the two footprints share more than `epsilon` of area.
    pub fn overlaps(&self, other: &Footprint, epsilon: f64) -> bool {
        bool2d::overlap_area(self, other) > epsilon
    }

    /// Rings as plain coordinate arrays: polygons, then rings, then points.
    pub fn to_rings(&self) -> Vec<Vec<Vec<[f64; 2]>>> {
        self.polygons()
            .iter()
            .map(|p| {
                std::iter::once(p.exterior())
                    .chain(p.interiors())
                    .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                    .collect()
            })
            .collect()
    }
}

impl From<Polygon<f64>> for Footprint {
    fn from(p: Polygon<f64>) -> Self {
        Footprint::Polygon(p)
    }
}

impl From<MultiPolygon<f64>> for Footprint {
    fn from(mp: MultiPolygon<f64>) -> Self {
        Footprint::from_multi(mp)
    }
}

/// Axis-aligned rectangle polygon, mostly useful in tests and fixtures.
pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    )
    .to_polygon()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::LineString;

    #[test]
    fn repaired_rectangle_keeps_area() {
        let fp = Footprint::repaired(&rectangle(0.0, 0.0, 4.0, 2.0)).unwrap();
        assert!(fp.is_single());
        assert_relative_eq!(fp.area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn rotated_rectangle_keeps_exact_area() {
        let (s, c) = 30f64.to_radians().sin_cos();
        let pts: Vec<(f64, f64)> = [(0.0, 0.0), (0.8, 0.0), (0.8, 1.8), (0.0, 1.8)]
            .iter()
            .map(|&(x, y)| (3.0 + x * c - y * s, 7.0 + x * s + y * c))
            .collect();
        let input = Polygon::new(LineString::from(pts), vec![]);
        let fp = Footprint::repaired(&input).unwrap();
        assert!(fp.is_single());
        assert_relative_eq!(fp.area(), input.unsigned_area(), epsilon = 1e-12);
        assert_relative_eq!(fp.area(), 0.8 * 1.8, epsilon = 1e-12);
    }

    #[test]
    fn bowtie_repair_keeps_both_lobes() {
        let bowtie = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]),
            vec![],
        );
        let fp = Footprint::repaired(&bowtie).unwrap();
        assert!(!fp.is_empty());
        assert_relative_eq!(fp.area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let line = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            vec![],
        );
        assert!(Footprint::repaired(&line).is_err());
    }

    #[test]
    fn translation_moves_centroid() {
        let fp = Footprint::from(rectangle(0.0, 0.0, 2.0, 2.0));
        let c = fp.translated(-1.0, -1.0).centroid().unwrap();
        assert_relative_eq!(c.x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.y(), 0.0, epsilon = 1e-12);
    }
}

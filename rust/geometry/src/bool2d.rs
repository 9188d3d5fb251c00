// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Footprint Algebra
//!
//! Union, difference and intersection of footprints using the i_overlay crate.
//! Inputs are converted to i_overlay paths with exterior rings
//! counter-clockwise and holes clockwise, and combined under the non-zero fill
//! rule so that overlapping parts of the same operand merge instead of
//! cancelling out.

use geo::orient::{Direction, Orient};
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Coord, Intersects, Line, LineString, MultiPolygon, Point, Polygon};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

use crate::footprint::Footprint;

/// Minimum area threshold - contours smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-12;

type Paths = Vec<Vec<[f64; 2]>>;

/// Repairs a polygon by overlaying it with nothing.
///
/// Self-intersections are resolved, duplicate and collinear vertices dropped,
/// and zero-area spikes removed.
pub fn make_valid(polygon: &Polygon<f64>) -> MultiPolygon<f64> {
    union_all(std::iter::once(polygon))
}

/// `true` for a hole-free polygon whose exterior ring is simple: at least
/// three vertices, positive area, and no edge touching another edge except
/// its neighbours at their shared vertex.
pub fn is_simple_ring_polygon(polygon: &Polygon<f64>) -> bool {
    if !polygon.interiors().is_empty() || polygon.unsigned_area() <= MIN_AREA_THRESHOLD {
        return false;
    }
    let path = ring_to_path(polygon.exterior());
    let n = path.len();
    if n < 3 || path.windows(2).any(|w| w[0] == w[1]) {
        return false;
    }
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| {
            let (a, b) = (path[i], path[(i + 1) % n]);
            Line::new(Coord { x: a[0], y: a[1] }, Coord { x: b[0], y: b[1] })
        })
        .collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return false,
            }
        }
    }
    true
}

/// Union of any number of polygons in a single overlay pass.
pub fn union_all<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>) -> MultiPolygon<f64> {
    let mut subject: Paths = Vec::new();
    for polygon in polygons {
        subject.extend(polygon_to_paths(polygon));
    }
    run_overlay(subject, Vec::new(), OverlayRule::Union)
}

pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    run_overlay(multi_to_paths(a), multi_to_paths(b), OverlayRule::Union)
}

/// `subject` minus `clip`.
pub fn difference(subject: &MultiPolygon<f64>, clip: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if clip.0.is_empty() {
        return subject.clone();
    }
    run_overlay(
        multi_to_paths(subject),
        multi_to_paths(clip),
        OverlayRule::Difference,
    )
}

pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    run_overlay(multi_to_paths(a), multi_to_paths(b), OverlayRule::Intersect)
}

/// Area shared by two footprints.
pub fn overlap_area(a: &Footprint, b: &Footprint) -> f64 {
    if !bounds_overlap(a, b) {
        return 0.0;
    }
    intersection(&a.to_multi(), &b.to_multi()).unsigned_area()
}

/// Length of `ring` lying inside or on the boundary of `footprint`.
///
/// Each ring segment is split at its crossings with the footprint's edges;
/// a piece counts when its midpoint is covered by the footprint.
pub fn boundary_length_inside(ring: &LineString<f64>, footprint: &Footprint) -> f64 {
    let edges: Vec<Line<f64>> = footprint
        .polygons()
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .flat_map(|r| r.lines())
        .collect();
    let mut total = 0.0;
    for segment in ring.lines() {
        let (dx, dy) = (segment.dx(), segment.dy());
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f64::EPSILON {
            continue;
        }
        let param = |c: Coord<f64>| ((c.x - segment.start.x) * dx + (c.y - segment.start.y) * dy) / (len * len);
        let mut cuts = vec![0.0, 1.0];
        for edge in &edges {
            match line_intersection(segment, *edge) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    cuts.push(param(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    cuts.push(param(intersection.start));
                    cuts.push(param(intersection.end));
                }
                None => {}
            }
        }
        cuts.retain(|t| (0.0..=1.0).contains(t));
        cuts.sort_by(|a, b| a.total_cmp(b));
        for pair in cuts.windows(2) {
            let (t0, t1) = (pair[0], pair[1]);
            if t1 - t0 <= f64::EPSILON {
                continue;
            }
            let tm = (t0 + t1) / 2.0;
            let mid = Point::new(segment.start.x + dx * tm, segment.start.y + dy * tm);
            if footprint.polygons().iter().any(|p| p.intersects(&mid)) {
                total += (t1 - t0) * len;
            }
        }
    }
    total
}

/// Check if the bounding boxes of two footprints overlap (touching counts)
pub fn bounds_overlap(a: &Footprint, b: &Footprint) -> bool {
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => {
            ra.min().x <= rb.max().x
                && ra.max().x >= rb.min().x
                && ra.min().y <= rb.max().y
                && ra.max().y >= rb.min().y
        }
        _ => false,
    }
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

fn run_overlay(subject: Paths, clip: Paths, rule: OverlayRule) -> MultiPolygon<f64> {
    if subject.is_empty() && clip.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    // Result is Vec<Vec<Vec<[f64; 2]>>> - Vec of shapes, each shape is Vec of contours
    let shapes = subject.overlay(&clip, rule, FillRule::NonZero);
    shapes_to_multipolygon(shapes)
}

fn multi_to_paths(multi: &MultiPolygon<f64>) -> Paths {
    multi.0.iter().flat_map(polygon_to_paths).collect()
}

/// Convert a polygon to i_overlay path format (exterior CCW, holes CW)
fn polygon_to_paths(polygon: &Polygon<f64>) -> Paths {
    let oriented = polygon.orient(Direction::Default);
    let mut paths = Vec::with_capacity(1 + oriented.interiors().len());
    paths.push(ring_to_path(oriented.exterior()));
    for hole in oriented.interiors() {
        paths.push(ring_to_path(hole));
    }
    paths.retain(|p| p.len() >= 3);
    paths
}

/// Ring coordinates without the closing point
fn ring_to_path(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut path: Vec<[f64; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
    if path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    path
}

fn path_to_ring(path: &[[f64; 2]]) -> LineString<f64> {
    LineString::new(path.iter().map(|p| Coord { x: p[0], y: p[1] }).collect())
}

/// Convert i_overlay result shapes back to a multi-polygon
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_multipolygon(shapes: Vec<Vec<Vec<[f64; 2]>>>) -> MultiPolygon<f64> {
    let mut polygons = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let mut contours = shape.iter().filter(|c| c.len() >= 3);
        let Some(outer) = contours.next() else {
            continue;
        };
        let exterior = path_to_ring(outer);
        let holes: Vec<LineString<f64>> = contours
            .map(|c| path_to_ring(c))
            .filter(|ring| Polygon::new(ring.clone(), vec![]).unsigned_area() > MIN_AREA_THRESHOLD)
            .collect();
        let polygon = Polygon::new(exterior, holes).orient(Direction::Default);
        if polygon.unsigned_area() > MIN_AREA_THRESHOLD {
            polygons.push(polygon);
        }
    }
    MultiPolygon::new(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::rectangle;
    use approx::assert_relative_eq;

    fn multi(p: Polygon<f64>) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![p])
    }

    #[test]
    fn union_of_touching_squares_is_one_polygon() {
        let a = rectangle(0.0, 0.0, 1.0, 1.0);
        let b = rectangle(1.0, 0.0, 2.0, 1.0);
        let result = union_all([&a, &b]);
        assert_eq!(result.0.len(), 1);
        assert_relative_eq!(result.unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn overlapping_parts_do_not_cancel() {
        let a = rectangle(0.0, 0.0, 2.0, 2.0);
        let b = rectangle(1.0, 1.0, 3.0, 3.0);
        let result = union_all([&a, &b]);
        assert_relative_eq!(result.unsigned_area(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn difference_punches_a_hole() {
        let outer = multi(rectangle(0.0, 0.0, 4.0, 4.0));
        let inner = multi(rectangle(1.0, 1.0, 2.0, 2.0));
        let result = difference(&outer, &inner);
        assert_eq!(result.0.len(), 1);
        assert_eq!(result.0[0].interiors().len(), 1);
        assert_relative_eq!(result.unsigned_area(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn difference_can_split() {
        let bar = multi(rectangle(0.0, 0.0, 3.0, 1.0));
        let cut = multi(rectangle(1.0, -1.0, 2.0, 2.0));
        let result = difference(&bar, &cut);
        assert_eq!(result.0.len(), 2);
        assert_relative_eq!(result.unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_length_inside_counts_covered_part() {
        let ring = rectangle(0.0, 0.0, 4.0, 4.0).exterior().clone();
        let door = Footprint::from(rectangle(1.0, -0.1, 2.0, 0.1));
        assert_relative_eq!(boundary_length_inside(&ring, &door), 1.0, epsilon = 1e-9);
        let far = Footprint::from(rectangle(10.0, 10.0, 11.0, 11.0));
        assert_eq!(boundary_length_inside(&ring, &far), 0.0);
    }

    #[test]
    fn simple_ring_detection() {
        assert!(is_simple_ring_polygon(&rectangle(0.0, 0.0, 1.0, 1.0)));
        let bowtie = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]),
            vec![],
        );
        assert!(!is_simple_ring_polygon(&bowtie));
        let spike = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (2.0, 3.0), (2.0, 2.0), (0.0, 2.0)]),
            vec![],
        );
        assert!(!is_simple_ring_polygon(&spike));
        let holed = difference(&multi(rectangle(0.0, 0.0, 4.0, 4.0)), &multi(rectangle(1.0, 1.0, 2.0, 2.0)));
        assert!(!is_simple_ring_polygon(&holed.0[0]));
    }

    #[test]
    fn overlap_area_of_touching_footprints_is_zero() {
        let a = Footprint::from(rectangle(0.0, 0.0, 1.0, 1.0));
        let b = Footprint::from(rectangle(1.0, 0.0, 2.0, 1.0));
        assert!(overlap_area(&a, &b) < 1e-9);
        let c = Footprint::from(rectangle(0.5, 0.0, 2.0, 1.0));
        assert_relative_eq!(overlap_area(&a, &c), 0.5, epsilon = 1e-9);
    }
}

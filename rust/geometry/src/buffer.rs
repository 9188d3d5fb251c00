// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buffering and clean-up passes over footprints.
//!
//! Buffers are built from square-capped edge strips: every ring edge is
//! swept into a rectangle extended by the buffer distance at both ends. The
//! union of the polygon with its strips grows it with mitre corners for right
//! angles; subtracting the strips shrinks it. This keeps buffering inside the
//! same boolean engine as the rest of the footprint algebra.

use geo::{Area, Coord, LineString, MultiPolygon, Polygon};

use crate::bool2d;

/// Grows (`distance > 0`) or shrinks (`distance < 0`) a multi-polygon.
pub fn buffer_mitre(multi: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance == 0.0 || multi.0.is_empty() {
        return multi.clone();
    }
    let strips = edge_strips(multi, distance.abs());
    if distance > 0.0 {
        bool2d::union_all(multi.0.iter().chain(strips.iter()))
    } else {
        let strips = bool2d::union_all(strips.iter());
        bool2d::difference(multi, &strips)
    }
}

/// Morphological closing: grow then shrink. Closes gaps narrower than
/// `2 * distance` and removes slivers left by touching edges.
pub fn close(multi: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    buffer_mitre(&buffer_mitre(multi, distance), -distance)
}

/// Morphological opening: shrink then grow. Removes parts thinner than
/// `2 * distance`.
pub fn open(multi: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    buffer_mitre(&buffer_mitre(multi, -distance), distance)
}

/// Rounds every coordinate to `precision` decimal places.
pub fn round_coordinates(multi: &MultiPolygon<f64>, precision: u32) -> MultiPolygon<f64> {
    let factor = 10f64.powi(precision as i32);
    let round = |c: &Coord<f64>| Coord {
        x: (c.x * factor).round() / factor,
        y: (c.y * factor).round() / factor,
    };
    MultiPolygon::new(
        multi
            .0
            .iter()
            .map(|p| {
                Polygon::new(
                    LineString::new(p.exterior().coords().map(round).collect()),
                    p.interiors()
                        .iter()
                        .map(|r| LineString::new(r.coords().map(round).collect()))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Keeps only exterior rings.
pub fn remove_holes(multi: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        multi
            .0
            .iter()
            .map(|p| Polygon::new(p.exterior().clone(), vec![]))
            .collect(),
    )
}

/// Fills holes whose area is below `min_area`.
pub fn remove_small_holes(multi: &MultiPolygon<f64>, min_area: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(
        multi
            .0
            .iter()
            .map(|p| {
                let holes = p
                    .interiors()
                    .iter()
                    .filter(|r| Polygon::new((*r).clone(), vec![]).unsigned_area() >= min_area)
                    .cloned()
                    .collect();
                Polygon::new(p.exterior().clone(), holes)
            })
            .collect(),
    )
}

/// Drops parts whose area is below `min_area`.
pub fn drop_small_pieces(multi: &MultiPolygon<f64>, min_area: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(
        multi
            .0
            .iter()
            .filter(|p| p.unsigned_area() >= min_area)
            .cloned()
            .collect(),
    )
}

/// One square-capped rectangle per ring edge.
fn edge_strips(multi: &MultiPolygon<f64>, distance: f64) -> Vec<Polygon<f64>> {
    let mut strips = Vec::new();
    for polygon in &multi.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for line in ring.lines() {
                let (dx, dy) = (line.end.x - line.start.x, line.end.y - line.start.y);
                let len = (dx * dx + dy * dy).sqrt();
                if len <= f64::EPSILON {
                    continue;
                }
                let (ux, uy) = (dx / len * distance, dy / len * distance);
                let (nx, ny) = (-uy, ux);
                let a = Coord { x: line.start.x - ux, y: line.start.y - uy };
                let b = Coord { x: line.end.x + ux, y: line.end.y + uy };
                strips.push(Polygon::new(
                    LineString::new(vec![
                        Coord { x: a.x + nx, y: a.y + ny },
                        Coord { x: b.x + nx, y: b.y + ny },
                        Coord { x: b.x - nx, y: b.y - ny },
                        Coord { x: a.x - nx, y: a.y - ny },
                    ]),
                    vec![],
                ));
            }
        }
    }
    strips
}

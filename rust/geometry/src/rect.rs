// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimum rotated rectangle helpers: sides, axes and frame projections.

use geo::{Coord, EuclideanLength, Line, LineString, Polygon};

use crate::footprint::Footprint;

/// The four sides of a rotated rectangle, split by length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectSides {
    pub short: [Line<f64>; 2],
    pub long: [Line<f64>; 2],
}

impl RectSides {
    /// Splits the sides of a footprint's minimum rotated rectangle.
    pub fn of(footprint: &Footprint) -> Option<Self> {
        let rect = footprint.minimum_rotated_rect()?;
        Self::of_rectangle(&rect)
    }

    /// Splits the sides of a polygon assumed to be a rectangle.
    pub fn of_rectangle(rect: &Polygon<f64>) -> Option<Self> {
        let mut lines: Vec<Line<f64>> = rect.exterior().lines().collect();
        if lines.len() < 4 {
            return None;
        }
        lines.truncate(4);
        // Opposite sides are 0/2 and 1/3.
        let (a, b) = ([lines[0], lines[2]], [lines[1], lines[3]]);
        if a[0].euclidean_length() <= b[0].euclidean_length() {
            Some(Self { short: a, long: b })
        } else {
            Some(Self { short: b, long: a })
        }
    }

    pub fn width(&self) -> f64 {
        self.short[0].euclidean_length()
    }

    pub fn length(&self) -> f64 {
        self.long[0].euclidean_length()
    }

    /// Line through the rectangle centre along its long axis.
    pub fn centre_line(&self) -> Line<f64> {
        Line::new(
            midpoint(&self.short[0]),
            midpoint(&self.short[1]),
        )
    }
}

/// Width (shorter side) and length (longer side) of the rotated rectangle.
pub fn width_and_length(footprint: &Footprint) -> (f64, f64) {
    RectSides::of(footprint)
        .map(|s| (s.width(), s.length()))
        .unwrap_or((0.0, 0.0))
}

pub fn midpoint(line: &Line<f64>) -> Coord<f64> {
    Coord {
        x: (line.start.x + line.end.x) / 2.0,
        y: (line.start.y + line.end.y) / 2.0,
    }
}

/// Unit direction of a line, `None` when degenerate.
pub fn unit_direction(line: &Line<f64>) -> Option<Coord<f64>> {
    let (dx, dy) = (line.end.x - line.start.x, line.end.y - line.start.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON {
        None
    } else {
        Some(Coord { x: dx / len, y: dy / len })
    }
}

/// Scales a line about its midpoint.
pub fn scale_line(line: &Line<f64>, factor: f64) -> Line<f64> {
    let m = midpoint(line);
    Line::new(
        Coord {
            x: m.x + (line.start.x - m.x) * factor,
            y: m.y + (line.start.y - m.y) * factor,
        },
        Coord {
            x: m.x + (line.end.x - m.x) * factor,
            y: m.y + (line.end.y - m.y) * factor,
        },
    )
}

/// Orthonormal 2D frame: projections onto `u` (along) and `n` (across).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Coord<f64>,
    pub u: Coord<f64>,
    pub n: Coord<f64>,
}

impl Frame {
    /// Frame whose `u` axis follows `direction` (must be unit length).
    pub fn along(origin: Coord<f64>, direction: Coord<f64>) -> Self {
        Self {
            origin,
            u: direction,
            n: Coord { x: -direction.y, y: direction.x },
        }
    }

    /// `(along, across)` coordinates of `c`.
    pub fn project(&self, c: Coord<f64>) -> (f64, f64) {
        let (dx, dy) = (c.x - self.origin.x, c.y - self.origin.y);
        (dx * self.u.x + dy * self.u.y, dx * self.n.x + dy * self.n.y)
    }

    pub fn unproject(&self, t: f64, s: f64) -> Coord<f64> {
        Coord {
            x: self.origin.x + self.u.x * t + self.n.x * s,
            y: self.origin.y + self.u.y * t + self.n.y * s,
        }
    }

    /// `((t_min, t_max), (s_min, s_max))` over all coordinates.
    pub fn extent<'a>(
        &self,
        coords: impl IntoIterator<Item = &'a Coord<f64>>,
    ) -> Option<((f64, f64), (f64, f64))> {
        let mut iter = coords.into_iter();
        let first = self.project(*iter.next()?);
        let mut t = (first.0, first.0);
        let mut s = (first.1, first.1);
        for c in iter {
            let (pt, ps) = self.project(*c);
            t = (t.0.min(pt), t.1.max(pt));
            s = (s.0.min(ps), s.1.max(ps));
        }
        Some((t, s))
    }

    /// Rectangle spanning `t` along and `s` across the frame.
    pub fn rectangle(&self, t: (f64, f64), s: (f64, f64)) -> Polygon<f64> {
        Polygon::new(
            LineString::new(vec![
                self.unproject(t.0, s.0),
                self.unproject(t.1, s.0),
                self.unproject(t.1, s.1),
                self.unproject(t.0, s.1),
            ]),
            vec![],
        )
    }
}

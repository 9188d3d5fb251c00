// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan-Lite Geometry
//!
//! Floating-point-robust 2D footprint algebra for floor plans: validity
//! repair, union/difference/intersection through i_overlay, mitre buffering,
//! coordinate rounding, rotated-rectangle frames, a bounding-box grid index
//! for spatial joins, and the georeferencing transform seam. Every tolerance
//! is carried by [`GeometryTolerances`].

pub mod bool2d;
pub mod buffer;
pub mod error;
pub mod footprint;
pub mod index;
pub mod rect;
pub mod tolerance;
pub mod transform;

// Re-export geo types for convenience
pub use geo::{Coord, Line, LineString, MultiPolygon, Point, Polygon};

pub use error::{Error, Result};
pub use footprint::{rectangle, Footprint};
pub use index::FootprintIndex;
pub use rect::{Frame, RectSides};
pub use tolerance::GeometryTolerances;
pub use transform::{AffineGeoreference, GeoreferenceTransform};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan-Lite Layout
//!
//! Domain model of one floor of a building: spaces made of typed areas,
//! features placed in areas, separators (walls, railings, columns, area
//! splitters) owning their openings, and the [`Layout`] aggregate that ties
//! them together.
//!
//! A layout is assembled with [`LayoutBuilder`] and then frozen. Relationship
//! indices (which openings and separators touch which area or space) and
//! derived footprints are computed on first use and memoized; the layout is
//! `Send` but not `Sync`, one layout per worker.
//!
//! ```no_run
//! use floorplan_layout::{
//!     Area, AreaType, ClassificationScheme, Height, LayoutBuilder, Space,
//! };
//! use floorplan_geometry::rectangle;
//!
//! # fn main() -> floorplan_layout::Result<()> {
//! let room = Area::new("a1", AreaType::Room, &rectangle(0.0, 0.0, 4.0, 3.0), Height::default())?;
//! let space = Space::from_areas("s1", [room], Height::default())?;
//!
//! let mut builder = LayoutBuilder::new(ClassificationScheme::unified());
//! builder.add_spaces([space]);
//! let layout = builder.build()?;
//! println!("{:.2} m²", layout.footprint()?.area());
//! # Ok(())
//! # }
//! ```

pub mod area;
pub mod classification;
pub mod entity;
pub mod error;
pub mod feature;
pub mod layout;
pub mod opening;
pub mod scene;
pub mod separator;
pub mod serialization;
pub mod space;
pub mod types;
pub mod violation;

pub use area::Area;
pub use classification::ClassificationScheme;
pub use entity::{EntityId, Height, Spatial, SpatialEntity};
pub use error::{Error, Result};
pub use feature::{Feature, Placement};
pub use layout::{IdIndex, Layout, LayoutBuilder};
pub use opening::{adjust_geometry_to_wall, DoorSweep, Opening};
pub use scene::{children_of, SceneNode};
pub use separator::Separator;
pub use serialization::NodeSnapshot;
pub use space::Space;
pub use types::{
    AreaType, FeatureType, OpeningSubType, OpeningType, ParametricalGeometry, SeparatorType,
    WallSide,
};
pub use violation::{ObjectType, Violation, ViolationKind};

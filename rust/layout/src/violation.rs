// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Findings attached to layout entities.
//!
//! Violations are collected, never thrown. Each carries a blocking flag so
//! that downstream policy decides what to do with it.

use geo::Point;
use serde::{Deserialize, Serialize};

/// Closed taxonomy of geometric and business findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    // Mapping
    SpaceNotCovered,
    SpaceOverlapping,
    AreaNotCovered,
    AreaOverlapping,
    AreaTooSmall,
    OpeningOverlapsMultipleWalls,
    OpeningNotInWall,
    OpeningTooSmall,
    FeatureNotAssigned,
    FeatureOverlapsMultipleAreas,
    SeparatorOverlapping,
    SeparatorTooThin,
    InvalidGeometry,
    // Splitting
    UnitNotSplit,
    AreaNotAssignedToUnit,
    AreaAssignedToMultipleUnits,
    UnitWithoutEntrance,
    UnitNotConnected,
    PublicSpaceInUnit,
    // Classification
    AreaNotDefined,
    AreaTypeNotAllowed,
    ShaftWithoutShaftFeature,
    ShaftFeatureOutsideShaft,
    ElevatorWithoutElevatorArea,
    StairsWithoutStairArea,
    WaterFeatureOutsideWetArea,
    BathroomWithoutToilet,
    KitchenWithoutKitchenFeature,
    RoomWithoutWindow,
    RoomWithoutDoor,
    BalconyWithoutRailing,
    OutdoorAreaWithoutDoor,
    // Georeferencing
    LayoutNotGeoreferenced,
    GeoreferenceOutOfBounds,
    FloorOverlapsPrevious,
    ScaleFactorOutOfRange,
    // Linking
    AreaNotLinked,
    AreaLinkedTwice,
    ExternalIdMismatch,
    NetAreaMismatch,
    RoomCountMismatch,
}

impl ViolationKind {
    /// Default message for this kind of finding.
    pub fn text(&self) -> &'static str {
        use ViolationKind::*;
        match self {
            SpaceNotCovered => "Space is not covered by any area",
            SpaceOverlapping => "Space overlaps another space",
            AreaNotCovered => "Area is not part of any space",
            AreaOverlapping => "Area overlaps another area",
            AreaTooSmall => "Area is too small",
            OpeningOverlapsMultipleWalls => "Opening overlaps more than one wall",
            OpeningNotInWall => "Opening is not inside a wall",
            OpeningTooSmall => "Opening is too small",
            FeatureNotAssigned => "Feature is not inside any area",
            FeatureOverlapsMultipleAreas => "Feature overlaps more than one area",
            SeparatorOverlapping => "Separator overlaps another separator",
            SeparatorTooThin => "Separator is too thin",
            InvalidGeometry => "Geometry is invalid",
            UnitNotSplit => "Layout has not been split into units",
            AreaNotAssignedToUnit => "Area is not assigned to any unit",
            AreaAssignedToMultipleUnits => "Area is assigned to more than one unit",
            UnitWithoutEntrance => "Unit has no entrance door",
            UnitNotConnected => "Unit areas are not connected",
            PublicSpaceInUnit => "Public space is assigned to a unit",
            AreaNotDefined => "Area type is not defined",
            AreaTypeNotAllowed => "Area type is not allowed in this classification",
            ShaftWithoutShaftFeature => "Shaft area does not contain a shaft",
            ShaftFeatureOutsideShaft => "Shaft is placed in an area that does not accept shafts",
            ElevatorWithoutElevatorArea => "Elevator is not placed in an elevator area",
            StairsWithoutStairArea => "Stairs are not placed in a stair area",
            WaterFeatureOutsideWetArea => "Water connection is placed outside a wet area",
            BathroomWithoutToilet => "Bathroom has no toilet",
            KitchenWithoutKitchenFeature => "Kitchen has no kitchen element",
            RoomWithoutWindow => "Room has no window",
            RoomWithoutDoor => "Room has no door",
            BalconyWithoutRailing => "Balcony has no railing",
            OutdoorAreaWithoutDoor => "Outdoor area is not reachable through a door",
            LayoutNotGeoreferenced => "Layout is not georeferenced",
            GeoreferenceOutOfBounds => "Georeferenced layout lies outside the site",
            FloorOverlapsPrevious => "Floor does not overlap the floor below",
            ScaleFactorOutOfRange => "Scale factor is out of range",
            AreaNotLinked => "Area is not linked to a unit area",
            AreaLinkedTwice => "Area is linked to more than one unit area",
            ExternalIdMismatch => "External reference does not match",
            NetAreaMismatch => "Net area differs from the reference",
            RoomCountMismatch => "Room count differs from the reference",
        }
    }

    /// Whether findings of this kind block further processing by default.
    pub fn is_blocking(&self) -> bool {
        use ViolationKind::*;
        !matches!(
            self,
            AreaTooSmall
                | OpeningTooSmall
                | SeparatorTooThin
                | BathroomWithoutToilet
                | KitchenWithoutKitchenFeature
                | RoomWithoutWindow
                | RoomWithoutDoor
                | BalconyWithoutRailing
                | OutdoorAreaWithoutDoor
                | NetAreaMismatch
                | RoomCountMismatch
        )
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Kind of entity a violation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Layout,
    Space,
    Area,
    Separator,
    Opening,
    Feature,
}

/// A recorded finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub position: [f64; 2],
    pub object_id: String,
    pub object_type: ObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_id: Option<String>,
    pub is_blocking: bool,
    pub text: String,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        position: Point<f64>,
        object_id: impl Into<String>,
        object_type: ObjectType,
    ) -> Self {
        Self {
            kind,
            position: [position.x(), position.y()],
            object_id: object_id.into(),
            object_type,
            human_id: None,
            is_blocking: kind.is_blocking(),
            text: kind.text().to_string(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_human_id(mut self, human_id: impl Into<String>) -> Self {
        self.human_id = Some(human_id.into());
        self
    }

    pub fn blocking(mut self, is_blocking: bool) -> Self {
        self.is_blocking = is_blocking;
        self
    }

    pub fn position(&self) -> Point<f64> {
        Point::new(self.position[0], self.position[1])
    }
}

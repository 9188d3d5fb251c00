// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type tags for floor plan entities.
//!
//! These enums close the set of values an annotation can carry. Which of
//! them count as outdoor, net area, rooms and so on is decided by the
//! injected [`ClassificationScheme`](crate::classification::ClassificationScheme).

use serde::{Deserialize, Serialize};

/// Type of an area (room, balcony, shaft, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaType {
    NotDefined,
    Room,
    Bedroom,
    LivingRoom,
    LivingDining,
    Dining,
    Kitchen,
    KitchenDining,
    Bathroom,
    Corridor,
    Storeroom,
    Office,
    Balcony,
    Loggia,
    Terrace,
    Garden,
    Wintergarten,
    Staircase,
    Elevator,
    Shaft,
    Void,
    Lightwell,
    Technical,
    CarParking,
    BikeStorage,
}

impl AreaType {
    /// Returns the annotation name of this area type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::NotDefined => "NOT_DEFINED",
            AreaType::Room => "ROOM",
            AreaType::Bedroom => "BEDROOM",
            AreaType::LivingRoom => "LIVING_ROOM",
            AreaType::LivingDining => "LIVING_DINING",
            AreaType::Dining => "DINING",
            AreaType::Kitchen => "KITCHEN",
            AreaType::KitchenDining => "KITCHEN_DINING",
            AreaType::Bathroom => "BATHROOM",
            AreaType::Corridor => "CORRIDOR",
            AreaType::Storeroom => "STOREROOM",
            AreaType::Office => "OFFICE",
            AreaType::Balcony => "BALCONY",
            AreaType::Loggia => "LOGGIA",
            AreaType::Terrace => "TERRACE",
            AreaType::Garden => "GARDEN",
            AreaType::Wintergarten => "WINTERGARTEN",
            AreaType::Staircase => "STAIRCASE",
            AreaType::Elevator => "ELEVATOR",
            AreaType::Shaft => "SHAFT",
            AreaType::Void => "VOID",
            AreaType::Lightwell => "LIGHTWELL",
            AreaType::Technical => "TECHNICAL",
            AreaType::CarParking => "CAR_PARKING",
            AreaType::BikeStorage => "BIKE_STORAGE",
        }
    }
}

impl Default for AreaType {
    fn default() -> Self {
        AreaType::NotDefined
    }
}

impl std::fmt::Display for AreaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a feature is expected to stand against a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Short,
    Long,
}

/// Type of a fixed feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    NotDefined,
    Toilet,
    Sink,
    Bathtub,
    Shower,
    Kitchen,
    WashingMachine,
    BuiltInFurniture,
    Stairs,
    Elevator,
    Shaft,
    Ramp,
    Seat,
    CarParking,
    BikeParking,
}

impl FeatureType {
    /// Side expected against a wall, if the feature is wall-mounted.
    pub fn expected_wall_side(&self) -> Option<WallSide> {
        match self {
            FeatureType::Toilet | FeatureType::WashingMachine => Some(WallSide::Short),
            FeatureType::Sink
            | FeatureType::Bathtub
            | FeatureType::Kitchen
            | FeatureType::BuiltInFurniture => Some(WallSide::Long),
            _ => None,
        }
    }

    /// Features that need a water connection.
    pub fn is_water_connection(&self) -> bool {
        matches!(
            self,
            FeatureType::Toilet | FeatureType::Bathtub | FeatureType::Shower | FeatureType::Sink
        )
    }
}

/// Type of an opening cut into a separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpeningType {
    Window,
    Door,
    EntranceDoor,
}

impl OpeningType {
    pub fn is_door(&self) -> bool {
        matches!(self, OpeningType::Door | OpeningType::EntranceDoor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpeningSubType {
    Default,
    Sliding,
}

/// Type of a separating element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeparatorType {
    Wall,
    Railing,
    Column,
    AreaSplitter,
}

impl SeparatorType {
    /// Separators that do not close the building envelope.
    pub fn is_non_envelope(&self) -> bool {
        matches!(self, SeparatorType::Railing | SeparatorType::AreaSplitter)
    }
}

/// Parametric shape hint for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParametricalGeometry {
    Rectangular,
    Circular,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_type_names_match_serde() {
        for ty in [AreaType::NotDefined, AreaType::LivingDining, AreaType::CarParking] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }

    #[test]
    fn water_connections() {
        assert!(FeatureType::Toilet.is_water_connection());
        assert!(FeatureType::Sink.is_water_connection());
        assert!(!FeatureType::Stairs.is_water_connection());
    }

    #[test]
    fn doors_and_windows() {
        assert!(OpeningType::EntranceDoor.is_door());
        assert!(!OpeningType::Window.is_door());
    }
}

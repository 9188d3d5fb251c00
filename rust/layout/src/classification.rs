// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification policy injected into a layout.
//!
//! The layout never hardcodes which area types are outdoor, count towards
//! net area, or are produced by feature-based type inference; it looks them
//! up here. Schemes load from JSON so deployments can swap taxonomies.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::AreaType;

/// Lookup tables that give area types their meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScheme {
    pub name: String,
    /// Fraction of an area's surface counted as net area.
    pub net_area_contribution: FxHashMap<AreaType, f64>,
    /// Room-count weight per area type.
    pub room_count_weight: FxHashMap<AreaType, f64>,
    pub outdoor_areas: FxHashSet<AreaType>,
    pub balcony_areas: FxHashSet<AreaType>,
    pub areas_without_ceiling: FxHashSet<AreaType>,
    pub areas_without_floor: FxHashSet<AreaType>,
    pub areas_accepting_shafts: FxHashSet<AreaType>,
    /// Areas cut out of the feature-free footprint (shafts, voids).
    pub void_areas: FxHashSet<AreaType>,
    pub default_elevator_area: AreaType,
    pub default_water_connection_area: AreaType,
    pub default_shaft_area: AreaType,
    pub default_stair_area: AreaType,
}

impl ClassificationScheme {
    /// The built-in residential scheme.
    pub fn unified() -> Self {
        use AreaType::*;

        let net_area_contribution = [
            Room, Bedroom, LivingRoom, LivingDining, Dining, Kitchen, KitchenDining, Bathroom,
            Corridor, Storeroom, Office, Wintergarten,
        ]
        .into_iter()
        .map(|t| (t, 1.0))
        .collect();

        let room_count_weight = [
            (Room, 1.0),
            (Bedroom, 1.0),
            (LivingRoom, 1.0),
            (LivingDining, 1.0),
            (Dining, 0.5),
            (KitchenDining, 0.5),
            (Office, 1.0),
        ]
        .into_iter()
        .collect();

        Self {
            name: "UNIFIED".to_string(),
            net_area_contribution,
            room_count_weight,
            outdoor_areas: [Balcony, Loggia, Terrace, Garden].into_iter().collect(),
            balcony_areas: [Balcony].into_iter().collect(),
            areas_without_ceiling: [Balcony, Terrace, Garden, Lightwell, Void].into_iter().collect(),
            areas_without_floor: [Shaft, Void, Lightwell].into_iter().collect(),
            areas_accepting_shafts: [Shaft, Bathroom, Kitchen, KitchenDining, Technical, Storeroom]
                .into_iter()
                .collect(),
            void_areas: [Shaft, Void].into_iter().collect(),
            default_elevator_area: Elevator,
            default_water_connection_area: Bathroom,
            default_shaft_area: Shaft,
            default_stair_area: Staircase,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn is_outdoor(&self, area_type: AreaType) -> bool {
        self.outdoor_areas.contains(&area_type)
    }

    pub fn net_area_factor(&self, area_type: AreaType) -> f64 {
        self.net_area_contribution
            .get(&area_type)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn room_weight(&self, area_type: AreaType) -> f64 {
        self.room_count_weight.get(&area_type).copied().unwrap_or(0.0)
    }
}

impl Default for ClassificationScheme {
    fn default() -> Self {
        Self::unified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_lookups() {
        let scheme = ClassificationScheme::unified();
        assert!(scheme.is_outdoor(AreaType::Balcony));
        assert!(!scheme.is_outdoor(AreaType::Room));
        assert_eq!(scheme.net_area_factor(AreaType::Shaft), 0.0);
        assert_eq!(scheme.room_weight(AreaType::Bedroom), 1.0);
    }

    #[test]
    fn json_round_trip_preserves_tables() {
        let scheme = ClassificationScheme::unified();
        let restored = ClassificationScheme::from_json(&scheme.to_json().unwrap()).unwrap();
        assert_eq!(restored, scheme);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ClassificationScheme::from_json("{\"name\": 3}"),
            Err(Error::Serialization(_))
        ));
    }
}

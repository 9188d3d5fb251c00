// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The layout aggregate: one floor of spaces and separators.
//!
//! A layout is assembled through [`LayoutBuilder`], where features are
//! assigned to areas and area types are inferred. [`LayoutBuilder::build`]
//! freezes it into a [`Layout`] whose relationship indices and derived
//! footprints are computed lazily and memoized. The only mutations left on a
//! built layout are the coordinate-frame transforms. Georeferencing drops
//! every cache; the relative conversion computes them first and keeps them,
//! since relationships only exist between absolute footprints.

mod assign;
mod footprint;
mod frame;
mod relations;
mod separators;

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use floorplan_geometry::{Footprint, GeometryTolerances};
use rustc_hash::FxHashMap;
use tracing::info;

use crate::area::Area;
use crate::classification::ClassificationScheme;
use crate::entity::{EntityId, Spatial};
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::opening::Opening;
use crate::separator::Separator;
use crate::space::Space;
use crate::types::AreaType;
use crate::violation::Violation;

/// Entity id to the ids of related entities.
pub type IdIndex = FxHashMap<EntityId, BTreeSet<EntityId>>;

/// Mutable assembly phase of a layout.
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    spaces: BTreeMap<EntityId, Space>,
    separators: BTreeMap<EntityId, Separator>,
    unassigned_features: Vec<Feature>,
    floor_number: i32,
    scale_factor: f64,
    scheme: ClassificationScheme,
    tolerances: GeometryTolerances,
    errors: Vec<Violation>,
}

impl LayoutBuilder {
    pub fn new(scheme: ClassificationScheme) -> Self {
        Self {
            spaces: BTreeMap::new(),
            separators: BTreeMap::new(),
            unassigned_features: Vec::new(),
            floor_number: 0,
            scale_factor: 1.0,
            scheme,
            tolerances: GeometryTolerances::default(),
            errors: Vec::new(),
        }
    }

    pub fn with_floor_number(mut self, floor_number: i32) -> Self {
        self.floor_number = floor_number;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_tolerances(mut self, tolerances: GeometryTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn add_spaces(&mut self, spaces: impl IntoIterator<Item = Space>) -> &mut Self {
        for space in spaces {
            self.spaces.insert(space.id().to_string(), space);
        }
        self
    }

    pub fn add_separators(&mut self, separators: impl IntoIterator<Item = Separator>) -> &mut Self {
        for separator in separators {
            self.separators.insert(separator.id().to_string(), separator);
        }
        self
    }

    /// Queues features for [`assign_features_to_areas`](Self::assign_features_to_areas).
    pub fn add_features(&mut self, features: impl IntoIterator<Item = Feature>) -> &mut Self {
        self.unassigned_features.extend(features);
        self
    }

    pub fn record_violation(&mut self, violation: Violation) -> &mut Self {
        self.errors.push(violation);
        self
    }

    pub fn spaces(&self) -> impl Iterator<Item = &Space> + '_ {
        self.spaces.values()
    }

    pub fn unassigned_features(&self) -> &[Feature] {
        &self.unassigned_features
    }

    /// Freezes the builder into a layout.
    ///
    /// Every opening takes its reference offset ratio from the tolerances.
    /// Fails if the tolerances are unusable.
    pub fn build(mut self) -> Result<Layout> {
        self.tolerances.validate()?;
        let ratio = self.tolerances.opening_reference_offset_ratio;
        for separator in self.separators.values_mut() {
            for opening in separator.openings_mut() {
                opening.set_reference_offset_ratio(ratio);
            }
        }
        info!(
            floor = self.floor_number,
            spaces = self.spaces.len(),
            separators = self.separators.len(),
            unassigned_features = self.unassigned_features.len(),
            "layout built"
        );
        Ok(Layout {
            spaces: self.spaces,
            separators: self.separators,
            unassigned_features: self.unassigned_features,
            floor_number: self.floor_number,
            scale_factor: self.scale_factor,
            scheme: self.scheme,
            tolerances: self.tolerances,
            errors: self.errors,
            is_in_relative_coordinates: false,
            cache: LayoutCache::default(),
        })
    }
}

#[derive(Debug, Clone, Default)]
struct LayoutCache {
    footprint: OnceCell<Footprint>,
    areas_openings: OnceCell<IdIndex>,
    areas_separators: OnceCell<IdIndex>,
    spaces_openings: OnceCell<IdIndex>,
    spaces_separators: OnceCell<IdIndex>,
    outdoor_doors: OnceCell<BTreeSet<EntityId>>,
    outdoor_spaces: OnceCell<BTreeSet<EntityId>>,
    non_overlapping: OnceCell<Vec<Separator>>,
}

/// One floor: spaces, separators and the policy to read them with.
#[derive(Debug, Clone)]
pub struct Layout {
    spaces: BTreeMap<EntityId, Space>,
    separators: BTreeMap<EntityId, Separator>,
    unassigned_features: Vec<Feature>,
    floor_number: i32,
    scale_factor: f64,
    scheme: ClassificationScheme,
    tolerances: GeometryTolerances,
    errors: Vec<Violation>,
    is_in_relative_coordinates: bool,
    cache: LayoutCache,
}

impl Layout {
    pub fn spaces(&self) -> impl Iterator<Item = &Space> + '_ {
        self.spaces.values()
    }

    pub fn space(&self, id: &str) -> Option<&Space> {
        self.spaces.get(id)
    }

    pub fn separators(&self) -> impl Iterator<Item = &Separator> + '_ {
        self.separators.values()
    }

    pub fn separator_by_id(&self, id: &str) -> Option<&Separator> {
        self.separators.get(id)
    }

    /// Features that could not be placed in exactly one area.
    pub fn unassigned_features(&self) -> &[Feature] {
        &self.unassigned_features
    }

    pub fn floor_number(&self) -> i32 {
        self.floor_number
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn scheme(&self) -> &ClassificationScheme {
        &self.scheme
    }

    pub fn tolerances(&self) -> &GeometryTolerances {
        &self.tolerances
    }

    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    pub fn record_violation(&mut self, violation: Violation) {
        self.errors.push(violation);
    }

    pub fn is_in_relative_coordinates(&self) -> bool {
        self.is_in_relative_coordinates
    }

    /// Every area of every space.
    pub fn areas(&self) -> impl Iterator<Item = &Area> + '_ {
        self.spaces.values().flat_map(|s| s.areas())
    }

    pub fn area_by_id(&self, id: &str) -> Option<&Area> {
        self.spaces.values().find_map(|s| s.area(id))
    }

    pub fn space_of_area(&self, area_id: &str) -> Option<&Space> {
        self.spaces.values().find(|s| s.area(area_id).is_some())
    }

    pub fn areas_by_type(&self, area_type: AreaType) -> Vec<&Area> {
        self.areas().filter(|a| a.area_type() == area_type).collect()
    }

    /// Every opening of every separator.
    pub fn openings(&self) -> impl Iterator<Item = &Opening> + '_ {
        self.separators.values().flat_map(|s| s.openings())
    }

    pub fn opening_by_id(&self, id: &str) -> Option<&Opening> {
        self.separators.values().find_map(|s| s.opening(id))
    }

    /// Features assigned to areas.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.spaces.values().flat_map(|s| s.features())
    }

    /// Area footprints weighted by the scheme's net-area contribution.
    pub fn net_area(&self) -> f64 {
        self.areas()
            .map(|a| a.footprint().area() * self.scheme.net_area_factor(a.area_type()))
            .sum()
    }

    /// Room count according to the scheme's per-type weights.
    pub fn number_of_rooms(&self) -> f64 {
        self.areas()
            .map(|a| self.scheme.room_weight(a.area_type()))
            .sum()
    }

    fn reset_cache(&mut self) {
        self.cache = LayoutCache::default();
    }

    /// Outline queries that would re-derive geometry need absolute
    /// footprints.
    fn ensure_absolute(&self, what: &str) -> Result<()> {
        if self.is_in_relative_coordinates {
            return Err(Error::invalid_shape(what, "layout is in relative coordinates"));
        }
        Ok(())
    }
}

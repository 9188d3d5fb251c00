// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Uniform read-only view over the layout hierarchy.
//!
//! [`SceneNode`] tags a borrowed entity with its kind, and [`children_of`]
//! walks the ownership tree: layout to separators and spaces, separators to
//! openings, spaces to areas, areas to features.

use serde::Serialize;

use crate::area::Area;
use crate::entity::{Spatial, SpatialEntity};
use crate::feature::Feature;
use crate::layout::Layout;
use crate::opening::Opening;
use crate::separator::Separator;
use crate::space::Space;

#[derive(Debug, Clone, Copy)]
pub enum SceneNode<'a> {
    Layout(&'a Layout),
    Space(&'a Space),
    Area(&'a Area),
    Separator(&'a Separator),
    Opening(&'a Opening),
    Feature(&'a Feature),
}

const LAYOUT_FIELDS: &[&str] = &["children"];
const SPACE_FIELDS: &[&str] = &["id", "footprint", "height", "position", "angle", "children"];
const TYPED_PARENT_FIELDS: &[&str] = &[
    "type", "id", "footprint", "height", "position", "angle", "children",
];
const TYPED_LEAF_FIELDS: &[&str] = &["type", "id", "footprint", "height", "position", "angle"];

impl<'a> SceneNode<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            SceneNode::Layout(_) => "layout",
            SceneNode::Space(_) => "space",
            SceneNode::Area(_) => "area",
            SceneNode::Separator(_) => "separator",
            SceneNode::Opening(_) => "opening",
            SceneNode::Feature(_) => "feature",
        }
    }

    /// Fields exported for this kind of node.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            SceneNode::Layout(_) => LAYOUT_FIELDS,
            SceneNode::Space(_) => SPACE_FIELDS,
            SceneNode::Area(_) | SceneNode::Separator(_) => TYPED_PARENT_FIELDS,
            SceneNode::Opening(_) | SceneNode::Feature(_) => TYPED_LEAF_FIELDS,
        }
    }

    pub fn entity(&self) -> Option<&'a SpatialEntity> {
        match *self {
            SceneNode::Layout(_) => None,
            SceneNode::Space(s) => Some(s.entity()),
            SceneNode::Area(a) => Some(a.entity()),
            SceneNode::Separator(s) => Some(s.entity()),
            SceneNode::Opening(o) => Some(o.entity()),
            SceneNode::Feature(f) => Some(f.entity()),
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        self.entity().map(SpatialEntity::id)
    }

    /// Annotation name of the node's type tag, if it has one.
    pub fn type_name(&self) -> Option<String> {
        match *self {
            SceneNode::Layout(_) | SceneNode::Space(_) => None,
            SceneNode::Area(a) => Some(a.area_type().as_str().to_string()),
            SceneNode::Separator(s) => tag_name(&s.separator_type()),
            SceneNode::Opening(o) => tag_name(&o.opening_type()),
            SceneNode::Feature(f) => tag_name(&f.feature_type()),
        }
    }
}

fn tag_name<T: Serialize>(tag: &T) -> Option<String> {
    match serde_json::to_value(tag) {
        Ok(serde_json::Value::String(name)) => Some(name),
        _ => None,
    }
}

/// Direct children of `node`, in id order.
pub fn children_of<'a>(node: SceneNode<'a>) -> Vec<SceneNode<'a>> {
    match node {
        SceneNode::Layout(layout) => layout
            .separators()
            .map(SceneNode::Separator)
            .chain(layout.spaces().map(SceneNode::Space))
            .collect(),
        SceneNode::Space(space) => space.areas().map(SceneNode::Area).collect(),
        SceneNode::Area(area) => area.features().map(SceneNode::Feature).collect(),
        SceneNode::Separator(separator) => separator.openings().map(SceneNode::Opening).collect(),
        SceneNode::Opening(_) | SceneNode::Feature(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Height;
    use crate::types::{AreaType, SeparatorType};
    use floorplan_geometry::rectangle;

    #[test]
    fn type_names_use_annotation_spelling() {
        let wall = Separator::new(
            "w",
            SeparatorType::AreaSplitter,
            &rectangle(0.0, 0.0, 2.0, 0.1),
            Height::default(),
        )
        .unwrap();
        let node = SceneNode::Separator(&wall);
        assert_eq!(node.type_name().as_deref(), Some("AREA_SPLITTER"));
        assert_eq!(node.id(), Some("w"));
        assert!(children_of(node).is_empty());
    }

    #[test]
    fn leaves_have_no_children_field() {
        let area = Area::new(
            "a",
            AreaType::Kitchen,
            &rectangle(0.0, 0.0, 2.0, 2.0),
            Height::default(),
        )
        .unwrap();
        assert!(SceneNode::Area(&area).fields().contains(&"children"));
        assert_eq!(SceneNode::Area(&area).kind(), "area");
        let fields = TYPED_LEAF_FIELDS;
        assert!(!fields.contains(&"children"));
    }
}

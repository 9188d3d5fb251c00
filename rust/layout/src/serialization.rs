// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON export of a layout.
//!
//! Each node of the scene tree becomes a [`NodeSnapshot`] holding only the
//! fields its kind exports (see [`SceneNode::fields`]). Footprints are
//! written as nested coordinate arrays: polygons, rings, points.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::scene::{children_of, SceneNode};

/// Serializable representation of one scene node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub kind: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Vec<Vec<Vec<[f64; 2]>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn of(node: SceneNode<'_>) -> Self {
        let mut snapshot = NodeSnapshot {
            kind: node.kind().to_string(),
            node_type: None,
            id: None,
            footprint: None,
            height: None,
            position: None,
            angle: None,
            children: Vec::new(),
        };
        let entity = node.entity();
        for field in node.fields() {
            match *field {
                "type" => snapshot.node_type = node.type_name(),
                "id" => snapshot.id = node.id().map(str::to_string),
                "footprint" => snapshot.footprint = entity.map(|e| e.footprint().to_rings()),
                "height" => snapshot.height = entity.map(|e| [e.height().lower(), e.height().upper()]),
                "position" => {
                    snapshot.position = entity.map(|e| [e.position().x(), e.position().y()])
                }
                "angle" => snapshot.angle = entity.map(|e| e.angle()),
                "children" => {
                    snapshot.children = children_of(node).into_iter().map(NodeSnapshot::of).collect()
                }
                _ => {}
            }
        }
        snapshot
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Layout {
    /// Creates a serializable snapshot of the whole scene tree.
    pub fn to_snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::of(SceneNode::Layout(self))
    }

    /// Serializes the layout to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

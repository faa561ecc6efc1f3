//! The graph document: the JSON contract between the layout core and its
//! renderers.
//!
//! ```json
//! {
//!   "version": [0, 1], "id": 0, "title": "Random Graph",
//!   "globalCoordinateInformation": {"system": "cartesian", "origin": [0, 0],
//!      "originLocation": "bottom-left", "width": 1024, "height": 1024},
//!   "localCoordinateInformation": {"origin": [0, 0], "width": 1024, "height": 1024},
//!   "nodes": [{"id": 0, "label": "label-0", "coordinate": [12.5, 980.0]}],
//!   "edges": [{"id": 0, "label": "label-0", "srcNodeId": 0, "dstNodeId": 1}]
//! }
//! ```

use std::collections::HashSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GraphError, Result};
use crate::graph::GraphModel;

/// Graph format version written by this crate.
pub const FORMAT_VERSION: [u32; 2] = [0, 1];

/// Whole-number coordinates are written as JSON integers (`1024`, not
/// `1024.0`), matching the documents the renderers were built against.
/// Binary serializers such as `serde-wasm-bindgen` keep plain floats.
mod wire {
    use super::*;

    /// Largest magnitude at which every integer is exactly representable.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    struct Number(f64);

    impl Serialize for Number {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            number(&self.0, serializer)
        }
    }

    pub fn number<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() && value.fract() == 0.0 && value.abs() <= MAX_EXACT {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn pair<S: Serializer>(value: &[f64; 2], serializer: S) -> std::result::Result<S::Ok, S::Error> {
        [Number(value[0]), Number(value[1])].serialize(serializer)
    }

    pub fn optional<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        value.map(Number).serialize(serializer)
    }
}

/// Default label for a node or edge id.
pub fn default_label(id: u32) -> String {
    format!("label-{id}")
}

/// Description of the global coordinate system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCoordinateInformation {
    pub system: String,
    #[serde(serialize_with = "wire::pair")]
    pub origin: [f64; 2],
    pub origin_location: String,
    #[serde(serialize_with = "wire::number")]
    pub width: f64,
    #[serde(serialize_with = "wire::number")]
    pub height: f64,
}

impl GlobalCoordinateInformation {
    pub fn cartesian(width: f64, height: f64) -> Self {
        Self {
            system: "cartesian".to_string(),
            origin: [0.0, 0.0],
            origin_location: "bottom-left".to_string(),
            width,
            height,
        }
    }
}

/// The region of the global frame a document actually covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalCoordinateInformation {
    #[serde(serialize_with = "wire::pair")]
    pub origin: [f64; 2],
    #[serde(serialize_with = "wire::number")]
    pub width: f64,
    #[serde(serialize_with = "wire::number")]
    pub height: f64,
}

impl LocalCoordinateInformation {
    pub fn new(origin: [f64; 2], width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: u32,
    pub label: String,
    #[serde(serialize_with = "wire::pair")]
    pub coordinate: [f64; 2],
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::optional"
    )]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: u32,
    pub label: String,
    pub src_node_id: u32,
    pub dst_node_id: u32,
}

/// A complete graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub version: [u32; 2],
    pub id: u32,
    pub title: String,
    pub global_coordinate_information: GlobalCoordinateInformation,
    // Early graph servers misspelled this key.
    #[serde(alias = "localCoordindateInformation")]
    pub local_coordinate_information: LocalCoordinateInformation,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    /// An empty document whose local region equals the global frame.
    pub fn new(id: u32, title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            version: FORMAT_VERSION,
            id,
            title: title.into(),
            global_coordinate_information: GlobalCoordinateInformation::cartesian(width, height),
            local_coordinate_information: LocalCoordinateInformation::new([0.0, 0.0], width, height),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn push_node(&mut self, id: u32, coordinate: [f64; 2]) {
        self.nodes.push(NodeRecord {
            id,
            label: default_label(id),
            coordinate,
            radius: None,
        });
    }

    pub fn push_edge(&mut self, id: u32, src_node_id: u32, dst_node_id: u32) {
        self.edges.push(EdgeRecord {
            id,
            label: default_label(id),
            src_node_id,
            dst_node_id,
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as JSON, wrapped as `callback(...)` when a callback is given.
    pub fn to_jsonp(&self, callback: Option<&str>) -> Result<String> {
        let json = self.to_json()?;
        Ok(match callback {
            Some(callback) if !callback.is_empty() => format!("{callback}({json})"),
            _ => json,
        })
    }

    /// Write a flat JSON snapshot.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self).map_err(snapshot_error)
    }

    /// Read a snapshot produced by [`write_snapshot`](Self::write_snapshot).
    pub fn read_snapshot<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(snapshot_error)
    }

    /// Restrict the document to a rectangular region of the global frame.
    ///
    /// Nodes outside the region are dropped, as are edges that lose either
    /// endpoint. Coordinates stay in the global frame; the local coordinate
    /// block describes the region.
    pub fn with_local_region(&self, region: LocalCoordinateInformation) -> Result<Self> {
        if !(region.width.is_finite() && region.width > 0.0) {
            return Err(GraphError::invalid(
                "w",
                format!("region width must be positive, got {}", region.width),
            ));
        }
        if !(region.height.is_finite() && region.height > 0.0) {
            return Err(GraphError::invalid(
                "h",
                format!("region height must be positive, got {}", region.height),
            ));
        }

        let model = GraphModel::from_document(self);
        let [x, y] = region.origin;
        let kept: HashSet<u32> = model
            .nodes_in_rect(x, y, x + region.width, y + region.height)
            .into_iter()
            .map(u32::from)
            .collect();

        Ok(Self {
            local_coordinate_information: region,
            nodes: self
                .nodes
                .iter()
                .filter(|n| kept.contains(&n.id))
                .cloned()
                .collect(),
            edges: self
                .edges
                .iter()
                .filter(|e| kept.contains(&e.src_node_id) && kept.contains(&e.dst_node_id))
                .cloned()
                .collect(),
            ..self.clone()
        })
    }
}

/// serde_json wraps reader/writer failures; surface those as I/O errors.
fn snapshot_error(err: serde_json::Error) -> GraphError {
    if err.is_io() {
        GraphError::Io(err.into())
    } else {
        GraphError::Json(err)
    }
}

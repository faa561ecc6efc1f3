//! Force Graph Testbed - WASM Module
//!
//! This module provides the layout core of the graph rendering testbed: a
//! random graph generator, a force-directed layout engine and the graph
//! document that the JavaScript renderers consume. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `layout`: Vector math, spring/charge simulation and frame normalization
//! - `generator`: Seeded random topology + layout → graph document
//! - `document`: The JSON graph document contract
//! - `graph`: Renderer-side graph model using petgraph's StableGraph
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `request`: Query-string requests and JSONP responses

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod document;
pub mod error;
pub mod generator;
pub mod graph;
pub mod layout;
pub mod request;
pub mod spatial;

pub use document::{GraphDocument, LocalCoordinateInformation};
pub use error::{GraphError, Result, VectorError};
pub use generator::{GeneratedGraph, GeneratorConfig, RandomGraphGenerator};
pub use graph::{GraphModel, NodeId};
pub use layout::{ForceDirectedConfig, ForceDirectedLayout, FrameConfig, LayoutStats};
pub use request::GraphRequest;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Forward numeric self-corrections of a layout run to the browser console.
fn report_layout_stats(stats: &LayoutStats) {
    if stats.rejected_updates > 0 || stats.coincident_pairs > 0 {
        let message = format!(
            "force layout: {} rejected position updates, {} coincident pairs skipped",
            stats.rejected_updates, stats.coincident_pairs
        );
        web_sys::console::warn_1(&message.into());
    }
}

/// Random graph generator exposed to JavaScript.
#[wasm_bindgen]
pub struct GraphLayoutWasm {
    generator: RandomGraphGenerator,
}

#[wasm_bindgen]
impl GraphLayoutWasm {
    /// Create a generator with the default configuration.
    ///
    /// Without a seed, one is drawn from `Math.random()`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> Self {
        Self {
            generator: RandomGraphGenerator::new(resolve_seed(seed)),
        }
    }

    /// Create a generator from a (possibly partial) `GeneratorConfig` object.
    ///
    /// ```js
    /// GraphLayoutWasm.withConfig(7, { title: "Demo", layout: { maxIterations: 50 } });
    /// ```
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        seed: Option<f64>,
        config: JsValue,
    ) -> std::result::Result<GraphLayoutWasm, JsError> {
        let config: GeneratorConfig = if config.is_undefined() || config.is_null() {
            GeneratorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            generator: RandomGraphGenerator::with_config(resolve_seed(seed), config)?,
        })
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Generate a laid-out random graph as a plain JS graph document.
    #[wasm_bindgen(js_name = randomGraph)]
    pub fn random_graph(
        &mut self,
        node_count: u32,
        connectivity: f64,
    ) -> std::result::Result<JsValue, JsError> {
        let generated = self
            .generator
            .generate_with_stats(node_count as usize, connectivity)?;
        report_layout_stats(&generated.stats);
        Ok(serde_wasm_bindgen::to_value(&generated.document)?)
    }

    /// Generate a random graph serialized as JSON, or JSONP when a callback
    /// name is given.
    #[wasm_bindgen(js_name = randomGraphJson)]
    pub fn random_graph_json(
        &mut self,
        node_count: u32,
        connectivity: f64,
        callback: Option<String>,
    ) -> std::result::Result<String, JsError> {
        let generated = self
            .generator
            .generate_with_stats(node_count as usize, connectivity)?;
        report_layout_stats(&generated.stats);
        Ok(generated.document.to_jsonp(callback.as_deref())?)
    }

    /// Answer a query string such as `nodeQuantity=40&nodeConnectivity=0.1`.
    #[wasm_bindgen(js_name = respondToQuery)]
    pub fn respond_to_query(&mut self, query: &str) -> std::result::Result<String, JsError> {
        let request = GraphRequest::from_query(query)?;
        Ok(request.respond(&mut self.generator)?)
    }
}

fn resolve_seed(seed: Option<f64>) -> u64 {
    let seed = seed.unwrap_or_else(|| js_sys::Math::random() * 9_007_199_254_740_992.0);
    seed as u64
}

/// Interactive view of a graph document exposed to JavaScript.
///
/// Holds the hit-testing index and the highlight/hover state the renderers
/// toggle on pointer events.
#[wasm_bindgen]
pub struct GraphViewWasm {
    model: GraphModel,
}

#[wasm_bindgen]
impl GraphViewWasm {
    /// Create an empty view.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            model: GraphModel::new(),
        }
    }

    /// Replace the displayed graph with a JS graph document object.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, document: JsValue) -> std::result::Result<(), JsError> {
        let document: GraphDocument = serde_wasm_bindgen::from_value(document)?;
        self.model = GraphModel::from_document(&document);
        Ok(())
    }

    /// Replace the displayed graph with a JSON graph document.
    #[wasm_bindgen(js_name = loadDocumentJson)]
    pub fn load_document_json(&mut self, json: &str) -> std::result::Result<(), JsError> {
        let document = GraphDocument::from_json(json)?;
        self.model = GraphModel::from_document(&document);
        Ok(())
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.model.node_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.model.edge_count() as u32
    }

    /// Node ids in document order, matching the layout of `getPositions`.
    #[wasm_bindgen(js_name = getNodeIds)]
    pub fn get_node_ids(&self) -> Vec<u32> {
        self.model.node_ids().into_iter().map(u32::from).collect()
    }

    #[wasm_bindgen(js_name = getLabel)]
    pub fn get_label(&self, node_id: u32) -> Option<String> {
        self.model.label(NodeId(node_id)).map(str::to_string)
    }

    /// Get neighbors of a node.
    ///
    /// Returns a Uint32Array of neighbor node IDs.
    #[wasm_bindgen(js_name = getNeighbors)]
    pub fn get_neighbors(&self, node_id: u32) -> Vec<u32> {
        self.model
            .neighbors(NodeId(node_id))
            .into_iter()
            .map(u32::from)
            .collect()
    }

    // =========================================================================
    // Buffers
    // =========================================================================

    /// Node positions as a Float32Array `[x0, y0, x1, y1, ...]`.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        Float32Array::from(&interleave_positions(&self.model)[..])
    }

    /// Edge endpoints as a Uint32Array `[src0, dst0, src1, dst1, ...]`.
    #[wasm_bindgen(js_name = getEdgePairs)]
    pub fn get_edge_pairs(&self) -> Vec<u32> {
        edge_pairs(&self.model)
    }

    /// Get the bounding box of all nodes.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if the view is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f64>> {
        self.model
            .bounds()
            .map(|b| vec![b.min_x, b.min_y, b.max_x, b.max_y])
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// The node under the pointer, if any.
    #[wasm_bindgen(js_name = getNodeAt)]
    pub fn get_node_at(&self, x: f64, y: f64) -> Option<u32> {
        self.model.node_at(x, y).map(u32::from)
    }

    /// Toggle the highlight of a node and its neighbors.
    ///
    /// Returns false when the node does not exist.
    #[wasm_bindgen(js_name = toggleHighlight)]
    pub fn toggle_highlight(&mut self, node_id: u32) -> bool {
        self.model.toggle_highlight(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = unhighlightAll)]
    pub fn unhighlight_all(&mut self) {
        self.model.unhighlight_all();
    }

    #[wasm_bindgen(js_name = isHighlighted)]
    pub fn is_highlighted(&self, node_id: u32) -> bool {
        self.model.is_highlighted(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = getHighlighted)]
    pub fn get_highlighted(&self) -> Vec<u32> {
        self.model
            .highlighted_nodes()
            .into_iter()
            .map(u32::from)
            .collect()
    }

    /// Track the node under the pointer for tooltips; `undefined` clears it.
    #[wasm_bindgen(js_name = setHovered)]
    pub fn set_hovered(&mut self, node_id: Option<u32>) {
        self.model.set_hovered(node_id.map(NodeId));
    }

    #[wasm_bindgen(js_name = getHovered)]
    pub fn get_hovered(&self) -> Option<u32> {
        self.model.hovered().map(u32::from)
    }
}

impl Default for GraphViewWasm {
    fn default() -> Self {
        Self::new()
    }
}

fn interleave_positions(model: &GraphModel) -> Vec<f32> {
    model
        .positions_x()
        .iter()
        .zip(model.positions_y())
        .flat_map(|(&x, &y)| [x as f32, y as f32])
        .collect()
}

fn edge_pairs(model: &GraphModel) -> Vec<u32> {
    model
        .edges()
        .into_iter()
        .flat_map(|(_, a, b)| [a.raw(), b.raw()])
        .collect()
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// The full pipeline a front end drives: generate → JSON → view model,
    /// without wasm_bindgen JS types.
    #[test]
    fn test_generate_serialize_and_view() {
        let mut generator = RandomGraphGenerator::new(21);
        let json = generator.generate(40, 0.15).unwrap().to_json().unwrap();

        let document = GraphDocument::from_json(&json).unwrap();
        let model = GraphModel::from_document(&document);

        assert_eq!(model.node_count(), 40);
        assert_eq!(model.edge_count(), document.edge_count());

        let positions = interleave_positions(&model);
        assert_eq!(positions.len(), 80);
        for (i, node) in document.nodes.iter().enumerate() {
            assert_eq!(positions[2 * i], node.coordinate[0] as f32);
            assert_eq!(positions[2 * i + 1], node.coordinate[1] as f32);
        }

        let pairs = edge_pairs(&model);
        assert_eq!(pairs.len(), document.edge_count() * 2);
        for (edge, pair) in document.edges.iter().zip(pairs.chunks(2)) {
            assert_eq!(pair, [edge.src_node_id, edge.dst_node_id]);
        }
    }

    #[test]
    fn test_click_highlights_node_and_neighbors() {
        let mut generator = RandomGraphGenerator::new(5);
        let document = generator.generate(4, 1.0).unwrap();
        let mut model = GraphModel::from_document(&document);

        let [x, y] = document.nodes[0].coordinate;
        let clicked = model.node_at(x + 1.0, y - 1.0).unwrap();
        assert_eq!(clicked, NodeId(0));

        assert!(model.toggle_highlight(clicked));
        assert!(model.is_highlighted(NodeId(0)));
        for neighbor in model.neighbors(clicked) {
            assert!(model.is_highlighted(neighbor));
        }

        model.unhighlight_all();
        assert!(model.highlighted_nodes().is_empty());
    }

    #[test]
    fn test_query_to_view() {
        let mut generator = RandomGraphGenerator::new(13);
        let body = GraphRequest::from_query("nodeQuantity=25&nodeConnectivity=0.2")
            .unwrap()
            .respond(&mut generator)
            .unwrap();

        let document = GraphDocument::from_json(&body).unwrap();
        let model = GraphModel::from_document(&document);
        let bounds = model.bounds().unwrap();

        assert_eq!(model.node_count(), 25);
        assert!(bounds.min_x >= 0.0 && bounds.max_x <= 1024.0);
        assert!(bounds.min_y >= 0.0 && bounds.max_y <= 1024.0);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_view() {
        let mut generator = RandomGraphGenerator::new(99);
        let document = generator.generate(15, 0.3).unwrap();

        let mut buffer = Vec::new();
        document.write_snapshot(&mut buffer).unwrap();
        let restored = GraphDocument::read_snapshot(buffer.as_slice()).unwrap();

        let before = GraphModel::from_document(&document);
        let after = GraphModel::from_document(&restored);
        assert_eq!(edge_pairs(&before), edge_pairs(&after));
        assert_eq!(interleave_positions(&before), interleave_positions(&after));
    }

    #[test]
    fn test_empty_view() {
        let model = GraphModel::new();
        assert!(interleave_positions(&model).is_empty());
        assert!(edge_pairs(&model).is_empty());
    }
}

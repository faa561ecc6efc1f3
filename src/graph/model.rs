//! GraphModel - the renderer-side view of a laid-out graph.
//!
//! The model stores the topology in petgraph's undirected `StableGraph` and
//! keeps per-node attributes in SoA (Structure of Arrays) buffers indexed by
//! the petgraph node index. An R-tree over node discs answers hit tests and
//! region queries.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::edge::EdgeId;
use super::node::{NodeId, NodeState};
use crate::document::GraphDocument;
use crate::layout::{Bounds, Vector2};
use crate::spatial::{NodeDisc, SpatialIndex};

/// Radius used for hit testing when a document does not specify one.
pub const DEFAULT_NODE_RADIUS: f64 = 20.0;

/// Nodes, undirected edges and interaction state of one displayed graph.
pub struct GraphModel {
    /// Nodes store their document id, edges store theirs.
    graph: StableUnGraph<NodeId, EdgeId>,

    /// Map from document NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Next id handed out by `add_edge`
    next_edge_id: u32,

    pos_x: Vec<f64>,
    pos_y: Vec<f64>,
    labels: Vec<String>,
    states: Vec<NodeState>,

    /// Node currently under the pointer, if any
    hovered: Option<NodeId>,

    spatial: SpatialIndex,
}

impl GraphModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a model with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableUnGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            next_edge_id: 0,
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            labels: Vec::with_capacity(node_capacity),
            states: Vec::with_capacity(node_capacity),
            hovered: None,
            spatial: SpatialIndex::new(),
        }
    }

    /// Build a model from a graph document.
    ///
    /// Duplicate node ids keep their first occurrence. Edges whose endpoints
    /// are missing, self loops and repeated pairs are skipped.
    pub fn from_document(doc: &GraphDocument) -> Self {
        let mut model = Self::with_capacity(doc.nodes.len(), doc.edges.len());

        let discs: Vec<NodeDisc> = doc
            .nodes
            .iter()
            .filter_map(|node| {
                let id = NodeId(node.id);
                let [x, y] = node.coordinate;
                model
                    .insert_node(id, node.coordinate, node.label.clone())
                    .then(|| NodeDisc::new(id, x, y, node.radius.unwrap_or(DEFAULT_NODE_RADIUS)))
            })
            .collect();
        model.spatial.rebuild(discs);

        let mut skipped = 0usize;
        for edge in &doc.edges {
            let inserted = model.insert_edge(
                EdgeId(edge.id),
                NodeId(edge.src_node_id),
                NodeId(edge.dst_node_id),
            );
            if inserted.is_none() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "ignored invalid or repeated edges while loading graph");
        }

        model
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node. Returns false if a node with this id already exists.
    pub fn add_node(&mut self, id: NodeId, x: f64, y: f64, label: impl Into<String>) -> bool {
        let added = self.insert_node(id, [x, y], label.into());
        if added {
            self.spatial.insert(NodeDisc::new(id, x, y, DEFAULT_NODE_RADIUS));
        }
        added
    }

    fn insert_node(&mut self, id: NodeId, [x, y]: [f64; 2], label: String) -> bool {
        if self.node_id_to_index.contains_key(&id) {
            return false;
        }

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        self.pos_x.push(x);
        self.pos_y.push(y);
        self.labels.push(label);
        self.states.push(NodeState::new());
        true
    }

    /// Get the number of nodes in the model.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if a node with this id exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get a node's position as `(x, y)`.
    pub fn position(&self, id: NodeId) -> Option<(f64, f64)> {
        self.slot(id).map(|i| (self.pos_x[i], self.pos_y[i]))
    }

    /// Get a node's label.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.slot(id).map(|i| self.labels[i].as_str())
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .map(|index| self.graph[index])
            .collect()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect two existing nodes.
    ///
    /// Returns `None` for missing endpoints, self loops and pairs that are
    /// already connected.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.insert_edge(EdgeId(self.next_edge_id), a, b)
    }

    fn insert_edge(&mut self, id: EdgeId, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a == b {
            return None;
        }
        let ia = *self.node_id_to_index.get(&a)?;
        let ib = *self.node_id_to_index.get(&b)?;
        if self.graph.find_edge(ia, ib).is_some() {
            return None;
        }

        self.graph.add_edge(ia, ib, id);
        self.next_edge_id = self.next_edge_id.max(id.0.saturating_add(1));
        Some(id)
    }

    /// Get the number of edges in the model.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if two nodes are connected, in either direction.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        match (self.node_id_to_index.get(&a), self.node_id_to_index.get(&b)) {
            (Some(&ia), Some(&ib)) => self.graph.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    /// Edges as `(id, first endpoint, second endpoint)` in insertion order.
    pub fn edges(&self) -> Vec<(EdgeId, NodeId, NodeId)> {
        self.graph
            .edge_references()
            .map(|e| (*e.weight(), self.graph[e.source()], self.graph[e.target()]))
            .collect()
    }

    /// Get the neighbors of a node. Empty for unknown ids.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.node_id_to_index
            .get(&id)
            .map(|&index| {
                self.graph
                    .neighbors(index)
                    .filter_map(|n| self.graph.node_weight(n).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// X positions, indexed like [`node_ids`](Self::node_ids).
    pub fn positions_x(&self) -> &[f64] {
        &self.pos_x
    }

    /// Y positions, indexed like [`node_ids`](Self::node_ids).
    pub fn positions_y(&self) -> &[f64] {
        &self.pos_y
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// The node whose disc contains `(x, y)`, if any.
    pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
        self.spatial.hit(x, y)
    }

    /// Node ids whose centers lie inside the rectangle, in insertion order.
    pub fn nodes_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<NodeId> {
        let mut found = self.spatial.centers_in_rect(min_x, min_y, max_x, max_y);
        found.sort_by_key(|id| self.slot(*id));
        found
    }

    // =========================================================================
    // Interaction State
    // =========================================================================

    /// Toggle the highlight of a node and of each of its neighbors.
    ///
    /// Returns false when the node does not exist.
    pub fn toggle_highlight(&mut self, id: NodeId) -> bool {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return false;
        };

        self.states[index.index()].toggle_highlighted();
        let neighbors: Vec<NodeIndex> = self.graph.neighbors(index).collect();
        for n in neighbors {
            self.states[n.index()].toggle_highlighted();
        }
        true
    }

    /// Check if a node is highlighted. False for unknown ids.
    pub fn is_highlighted(&self, id: NodeId) -> bool {
        self.slot(id)
            .map(|i| self.states[i].is_highlighted())
            .unwrap_or(false)
    }

    /// Highlighted node ids in insertion order.
    pub fn highlighted_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|index| self.states[index.index()].is_highlighted())
            .map(|index| self.graph[index])
            .collect()
    }

    /// Clear every highlight.
    pub fn unhighlight_all(&mut self) {
        for state in &mut self.states {
            state.set_highlighted(false);
        }
    }

    /// Mark `id` as the node under the pointer, clearing the previous one.
    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        if let Some(i) = self.hovered.and_then(|previous| self.slot(previous)) {
            self.states[i].set_hovered(false);
        }
        self.hovered = id.filter(|id| self.contains_node(*id));
        if let Some(i) = self.hovered.and_then(|current| self.slot(current)) {
            self.states[i].set_hovered(true);
        }
    }

    /// Get the node under the pointer.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Bounding box of all node centers, or `None` for an empty model.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_positions(
            self.pos_x
                .iter()
                .zip(&self.pos_y)
                .map(|(&x, &y)| Vector2::new(x, y)),
        )
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

//! R-tree over node discs using the rstar crate.
//!
//! Each node is indexed as the disc it is drawn as. A pointer hit test is
//! then a point query against the discs, while region requests select nodes
//! by their center.

use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

use crate::graph::NodeId;

/// A node's drawn disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDisc {
    pub id: NodeId,
    pub center: [f64; 2],
    pub radius: f64,
}

impl NodeDisc {
    /// Negative radii are treated as zero.
    pub fn new(id: NodeId, x: f64, y: f64, radius: f64) -> Self {
        Self {
            id,
            center: [x, y],
            radius: radius.max(0.0),
        }
    }

    fn center_distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.center[0] - point[0];
        let dy = self.center[1] - point[1];
        dx * dx + dy * dy
    }
}

impl RTreeObject for NodeDisc {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let [x, y] = self.center;
        let r = self.radius;
        AABB::from_corners([x - r, y - r], [x + r, y + r])
    }
}

impl PointDistance for NodeDisc {
    /// Squared distance to the disc, zero inside it.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let outside = (self.center_distance_2(point).sqrt() - self.radius).max(0.0);
        outside * outside
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.center_distance_2(point) <= self.radius * self.radius
    }
}

/// Spatial index over node discs.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<NodeDisc>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn insert(&mut self, disc: NodeDisc) {
        self.tree.insert(disc);
    }

    /// The node whose disc contains `(x, y)`.
    ///
    /// When discs overlap, the one with the closest center wins.
    pub fn hit(&self, x: f64, y: f64) -> Option<NodeId> {
        let point = [x, y];
        self.tree
            .locate_all_at_point(&point)
            .min_by(|a, b| {
                a.center_distance_2(&point)
                    .total_cmp(&b.center_distance_2(&point))
                    .then(a.id.cmp(&b.id))
            })
            .map(|disc| disc.id)
    }

    /// Nodes whose centers lie inside the rectangle (edges inclusive).
    pub fn centers_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<NodeId> {
        let rect = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope_intersecting(&rect)
            .filter(|disc| rect.contains_point(&disc.center))
            .map(|disc| disc.id)
            .collect()
    }

    /// Replace the contents in one bulk load.
    pub fn rebuild(&mut self, discs: Vec<NodeDisc>) {
        self.tree = RTree::bulk_load(discs);
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

//! Graph data structures consumed by the renderers.
//!
//! [`GraphModel`] holds a laid-out graph document with stable node and edge
//! ids, adjacency, hit testing and the highlight/hover state that the
//! interactive front ends toggle.

mod edge;
mod model;
mod node;

pub use edge::EdgeId;
pub use model::{GraphModel, DEFAULT_NODE_RADIUS};
pub use node::{NodeId, NodeState};

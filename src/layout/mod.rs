//! Force-directed layout engine.
//!
//! This module simulates nodes as charged particles and edges as springs,
//! then normalizes the settled positions into the fixed output frame that
//! renderers consume.

pub mod force_directed;
pub mod normalize;
pub mod physics;
pub mod vector;

pub use force_directed::{
    ForceDirectedConfig, ForceDirectedLayout, LayoutStats, SimulationRun, StepStats,
};
pub use normalize::{normalize_positions, Bounds, FrameConfig};
pub use physics::{PhysicsPoint, PointIndex, Spring};
pub use vector::Vector2;

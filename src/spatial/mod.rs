//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index for pointer hit tests
//! and region queries over the drawn node discs.

mod rtree;

pub use rtree::{NodeDisc, SpatialIndex};

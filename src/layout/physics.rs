//! Simulated particles and springs.
//!
//! A [`PhysicsPoint`] stands in for one graph node during a layout run and a
//! [`Spring`] for one edge. Springs refer to their end points by index into
//! the owning run's point collection; they never own the points.

use super::vector::Vector2;

/// Default spring rest length.
pub const DEFAULT_REST_LENGTH: f64 = 1.0;

/// Default spring stiffness (Hooke's-law constant).
pub const DEFAULT_STIFFNESS: f64 = 500.0;

/// Default particle mass.
pub const DEFAULT_MASS: f64 = 1.0;

/// Index of a point inside its simulation run. Also the node's public id.
pub type PointIndex = usize;

/// A particle representing one graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsPoint {
    /// 0-based creation index.
    pub id: u32,
    pub position: Vector2,
    pub velocity: Vector2,
    /// Force accumulator. Cleared after every velocity update.
    pub force: Vector2,
    pub mass: f64,
}

impl PhysicsPoint {
    /// Create a resting point at `position`.
    pub fn new(id: u32, position: Vector2, mass: f64) -> Self {
        Self {
            id,
            position,
            velocity: Vector2::zero(),
            force: Vector2::zero(),
            mass,
        }
    }

    /// Accumulate `force / mass` into the force accumulator.
    #[inline]
    pub fn apply_force(&mut self, force: Vector2) {
        self.force = self.force + Vector2::new(force.x / self.mass, force.y / self.mass);
    }

    /// Squared speed, this point's share of the run's kinetic energy.
    #[inline]
    pub fn speed_squared(&self) -> f64 {
        self.velocity.magnitude_squared()
    }
}

/// An undirected spring between two distinct points of the same run.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    /// Sequential id, scoped to the run.
    pub id: u32,
    pub point_a: PointIndex,
    pub point_b: PointIndex,
    pub rest_length: f64,
    pub stiffness: f64,
}

impl Spring {
    pub fn new(id: u32, point_a: PointIndex, point_b: PointIndex) -> Self {
        Self {
            id,
            point_a,
            point_b,
            rest_length: DEFAULT_REST_LENGTH,
            stiffness: DEFAULT_STIFFNESS,
        }
    }

    /// The end points as an ordered `(low, high)` pair.
    #[inline]
    pub fn key(&self) -> (PointIndex, PointIndex) {
        if self.point_a <= self.point_b {
            (self.point_a, self.point_b)
        } else {
            (self.point_b, self.point_a)
        }
    }
}

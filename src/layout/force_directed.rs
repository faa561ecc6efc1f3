//! Force-directed layout: Coulomb repulsion plus Hooke's-law springs.
//!
//! # Algorithm Overview
//!
//! Each iteration of [`ForceDirectedLayout::step`]:
//!
//! 1. **Repulsion:** every unordered pair of points pushes apart with a force
//!    of `repulsion / (0.5 * (|d| + 1)²)` along their separation. O(N²), no
//!    spatial approximation.
//! 2. **Springs:** every spring applies `stiffness * (rest - |d|) * 0.5` to
//!    each end point, pulling stretched springs together.
//! 3. **Velocity:** `v = (v + f * dt) * damping`, then the force accumulator
//!    is cleared.
//! 4. **Position:** `p = p + v * dt`, committed only when the result is finite.
//! 5. **Energy:** `Σ|v|²`, compared against the convergence threshold.
//!
//! The loop in [`ForceDirectedLayout::run`] stops once the kinetic energy is
//! at or below the threshold or the iteration budget is spent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::physics::{PhysicsPoint, PointIndex, Spring, DEFAULT_MASS};
use super::vector::Vector2;

/// Tunable simulation constants.
///
/// The defaults reproduce the testbed's original layout server, including
/// its deliberately small iteration budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceDirectedConfig {
    /// Integration timestep (default: 0.005).
    pub timestep: f64,
    /// Velocity multiplier applied every step (default: 0.5).
    pub damping_factor: f64,
    /// Coulomb repulsion constant (default: 100.0).
    pub repulsion_constant: f64,
    /// Kinetic energy at or below which the run stops (default: 0.01).
    pub convergence_threshold: f64,
    /// Hard iteration cap (default: 10).
    pub max_iterations: u32,
}

impl Default for ForceDirectedConfig {
    fn default() -> Self {
        Self {
            timestep: 0.005,
            damping_factor: 0.5,
            repulsion_constant: 100.0,
            convergence_threshold: 0.01,
            max_iterations: 10,
        }
    }
}

impl ForceDirectedConfig {
    /// Reject constants that would make the integration meaningless.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(crate::GraphError::invalid(
                "timestep",
                format!("must be a positive finite number, got {}", self.timestep),
            ));
        }
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(crate::GraphError::invalid(
                "dampingFactor",
                format!("must lie in [0, 1], got {}", self.damping_factor),
            ));
        }
        if !self.repulsion_constant.is_finite() {
            return Err(crate::GraphError::invalid(
                "repulsionConstant",
                format!("must be finite, got {}", self.repulsion_constant),
            ));
        }
        if self.convergence_threshold.is_nan() || self.convergence_threshold < 0.0 {
            return Err(crate::GraphError::invalid(
                "convergenceThreshold",
                format!("must be non-negative, got {}", self.convergence_threshold),
            ));
        }
        Ok(())
    }
}

/// The points and springs of one layout request.
///
/// A run is built, simulated and discarded; nothing is shared between runs.
#[derive(Debug, Clone, Default)]
pub struct SimulationRun {
    points: Vec<PhysicsPoint>,
    springs: Vec<Spring>,
    spring_keys: HashSet<(PointIndex, PointIndex)>,
}

impl SimulationRun {
    /// Create an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a run with pre-allocated point and spring storage.
    pub fn with_capacity(point_capacity: usize, spring_capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(point_capacity),
            springs: Vec::with_capacity(spring_capacity),
            spring_keys: HashSet::with_capacity(spring_capacity),
        }
    }

    /// Add a unit-mass point. Its index is also its id.
    pub fn add_point(&mut self, position: Vector2) -> PointIndex {
        self.add_point_with_mass(position, DEFAULT_MASS)
    }

    /// Add a point with an explicit mass.
    pub fn add_point_with_mass(&mut self, position: Vector2, mass: f64) -> PointIndex {
        let index = self.points.len();
        self.points.push(PhysicsPoint::new(index as u32, position, mass));
        index
    }

    /// Connect two points with a default spring.
    ///
    /// Returns the spring id, or `None` when either index is out of range,
    /// the indices are equal, or the pair is already connected.
    pub fn add_spring(&mut self, a: PointIndex, b: PointIndex) -> Option<u32> {
        if a == b || a >= self.points.len() || b >= self.points.len() {
            return None;
        }

        let id = self.springs.len() as u32;
        let spring = Spring::new(id, a, b);
        if !self.spring_keys.insert(spring.key()) {
            return None;
        }
        self.springs.push(spring);
        Some(id)
    }

    /// Points in creation order.
    pub fn points(&self) -> &[PhysicsPoint] {
        &self.points
    }

    /// Mutable access to the points, e.g. to seed velocities.
    pub fn points_mut(&mut self) -> &mut [PhysicsPoint] {
        &mut self.points
    }

    /// Springs in creation order.
    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Get the number of points in the run.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Get the number of springs in the run.
    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    /// Sum of squared speeds over all points.
    pub fn kinetic_energy(&self) -> f64 {
        self.points.iter().map(PhysicsPoint::speed_squared).sum()
    }
}

/// Counters gathered during one integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    pub kinetic_energy: f64,
    /// Position updates dropped because they were not finite.
    pub rejected_updates: u64,
    /// Pair or spring interactions skipped because the two points coincide.
    pub coincident_pairs: u64,
}

/// Outcome of a complete layout run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    pub iterations: u32,
    pub kinetic_energy: f64,
    /// Kinetic energy after each iteration.
    pub energy_history: Vec<f64>,
    /// True when the run stopped on the energy threshold rather than the cap.
    pub converged: bool,
    pub rejected_updates: u64,
    pub coincident_pairs: u64,
}

impl LayoutStats {
    fn record(&mut self, step: StepStats) {
        self.iterations += 1;
        self.kinetic_energy = step.kinetic_energy;
        self.energy_history.push(step.kinetic_energy);
        self.rejected_updates += step.rejected_updates;
        self.coincident_pairs += step.coincident_pairs;
    }
}

/// The layout engine. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct ForceDirectedLayout {
    config: ForceDirectedConfig,
}

impl ForceDirectedLayout {
    /// Create a layout engine with the given configuration.
    pub fn new(config: ForceDirectedConfig) -> Self {
        Self { config }
    }

    /// Get the active configuration.
    pub fn config(&self) -> &ForceDirectedConfig {
        &self.config
    }

    /// Simulate until convergence or the iteration cap.
    ///
    /// Runs with fewer than two points have nothing to simulate and return
    /// without iterating.
    pub fn run(&self, run: &mut SimulationRun) -> LayoutStats {
        let mut stats = LayoutStats {
            kinetic_energy: run.kinetic_energy(),
            ..LayoutStats::default()
        };

        if run.point_count() < 2 {
            stats.converged = stats.kinetic_energy <= self.config.convergence_threshold;
            return stats;
        }

        while stats.iterations < self.config.max_iterations {
            let step = self.step(run);
            stats.record(step);
            if step.kinetic_energy <= self.config.convergence_threshold {
                stats.converged = true;
                break;
            }
        }

        tracing::debug!(
            points = run.point_count(),
            springs = run.spring_count(),
            iterations = stats.iterations,
            kinetic_energy = stats.kinetic_energy,
            converged = stats.converged,
            "force-directed layout finished"
        );
        if stats.rejected_updates > 0 || stats.coincident_pairs > 0 {
            tracing::warn!(
                rejected_updates = stats.rejected_updates,
                coincident_pairs = stats.coincident_pairs,
                "layout dropped non-finite updates or coincident interactions"
            );
        }

        stats
    }

    /// Advance the run by a single iteration.
    pub fn step(&self, run: &mut SimulationRun) -> StepStats {
        let mut step = StepStats::default();

        self.apply_repulsion(&mut run.points, &mut step);
        apply_springs(&mut run.points, &run.springs, &mut step);
        self.update_velocities(&mut run.points);
        self.update_positions(&mut run.points, &mut step);

        step.kinetic_energy = run.kinetic_energy();
        step
    }

    fn apply_repulsion(&self, points: &mut [PhysicsPoint], step: &mut StepStats) {
        let ke = self.config.repulsion_constant;
        let n = points.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].position - points[j].position;
                let distance = d.magnitude() + 1.0;
                let force = d
                    .normalise()
                    .and_then(|direction| direction.multiply(ke).divide(distance * distance * 0.5));

                match force {
                    Ok(force) => {
                        points[i].apply_force(force);
                        points[j].apply_force(-force);
                    }
                    Err(_) => step.coincident_pairs += 1,
                }
            }
        }
    }

    fn update_velocities(&self, points: &mut [PhysicsPoint]) {
        let dt = self.config.timestep;
        let damping = self.config.damping_factor;

        for p in points.iter_mut() {
            p.velocity = (p.velocity + p.force * dt) * damping;
            p.force = Vector2::zero();
        }
    }

    fn update_positions(&self, points: &mut [PhysicsPoint], step: &mut StepStats) {
        let dt = self.config.timestep;

        for p in points.iter_mut() {
            let next = p.position + p.velocity * dt;
            if next.is_finite() {
                p.position = next;
            } else {
                step.rejected_updates += 1;
            }
        }
    }
}

fn apply_springs(points: &mut [PhysicsPoint], springs: &[Spring], step: &mut StepStats) {
    for s in springs {
        let d = points[s.point_b].position - points[s.point_a].position;
        let displacement = s.rest_length - d.magnitude();

        match d.normalise() {
            Ok(direction) => {
                points[s.point_a].apply_force(direction * (s.stiffness * displacement * -0.5));
                points[s.point_b].apply_force(direction * (s.stiffness * displacement * 0.5));
            }
            Err(_) => step.coincident_pairs += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point_run(a: Vector2, b: Vector2, connected: bool) -> SimulationRun {
        let mut run = SimulationRun::new();
        let i = run.add_point(a);
        let j = run.add_point(b);
        if connected {
            run.add_spring(i, j);
        }
        run
    }

    #[test]
    fn test_default_config_matches_reference_constants() {
        let config = ForceDirectedConfig::default();
        assert_eq!(config.timestep, 0.005);
        assert_eq!(config.damping_factor, 0.5);
        assert_eq!(config.repulsion_constant, 100.0);
        assert_eq!(config.convergence_threshold, 0.01);
        assert_eq!(config.max_iterations, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad_timestep = ForceDirectedConfig {
            timestep: 0.0,
            ..Default::default()
        };
        assert!(bad_timestep.validate().is_err());

        let bad_damping = ForceDirectedConfig {
            damping_factor: 1.5,
            ..Default::default()
        };
        assert!(bad_damping.validate().is_err());

        let bad_threshold = ForceDirectedConfig {
            convergence_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_partial_camel_case() {
        let config: ForceDirectedConfig =
            serde_json::from_str(r#"{"maxIterations": 500, "convergenceThreshold": 0.001}"#)
                .unwrap();
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.convergence_threshold, 0.001);
        assert_eq!(config.timestep, 0.005);
    }

    #[test]
    fn test_add_spring_rejects_self_loops_duplicates_and_bad_indices() {
        let mut run = SimulationRun::new();
        let a = run.add_point(Vector2::new(0.0, 0.0));
        let b = run.add_point(Vector2::new(1.0, 0.0));

        assert_eq!(run.add_spring(a, b), Some(0));
        assert_eq!(run.add_spring(b, a), None);
        assert_eq!(run.add_spring(a, a), None);
        assert_eq!(run.add_spring(a, 7), None);
        assert_eq!(run.spring_count(), 1);
    }

    #[test]
    fn test_point_ids_follow_creation_order() {
        let mut run = SimulationRun::new();
        for i in 0..5 {
            let index = run.add_point(Vector2::new(i as f64, 0.0));
            assert_eq!(index, i);
        }
        let ids: Vec<u32> = run.points().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_and_single_point_runs_return_immediately() {
        let layout = ForceDirectedLayout::default();

        let mut empty = SimulationRun::new();
        let stats = layout.run(&mut empty);
        assert_eq!(stats.iterations, 0);
        assert!(stats.converged);

        let mut single = SimulationRun::new();
        single.add_point(Vector2::new(0.3, 0.7));
        let stats = layout.run(&mut single);
        assert_eq!(stats.iterations, 0);
        assert_eq!(single.points()[0].position, Vector2::new(0.3, 0.7));
    }

    #[test]
    fn test_repulsion_pushes_points_apart() {
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), false);
        let layout = ForceDirectedLayout::default();
        layout.step(&mut run);

        let a = run.points()[0].position;
        let b = run.points()[1].position;
        assert!(a.x < 0.0, "left point should move left, got {}", a.x);
        assert!(b.x > 1.0, "right point should move right, got {}", b.x);
        assert_eq!(a.y, 0.0);
        assert_eq!(b.y, 0.0);
    }

    #[test]
    fn test_repulsion_magnitude_single_step() {
        // distance = 1 + 1 = 2, force = 100 / (4 * 0.5) = 50 along x.
        // v = (0 + 50 * 0.005) * 0.5 = 0.125; p = 1 + 0.125 * 0.005.
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), false);
        let step = ForceDirectedLayout::default().step(&mut run);

        let b = &run.points()[1];
        assert!((b.velocity.x - 0.125).abs() < 1e-12);
        assert!((b.position.x - 1.000_625).abs() < 1e-12);
        assert!((step.kinetic_energy - 2.0 * 0.125 * 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_stretched_spring_pulls_points_together() {
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), true);
        let layout = ForceDirectedLayout::new(ForceDirectedConfig {
            repulsion_constant: 0.0,
            ..Default::default()
        });
        layout.step(&mut run);

        assert!(run.points()[0].position.x > 0.0);
        assert!(run.points()[1].position.x < 10.0);
    }

    #[test]
    fn test_compressed_spring_pushes_points_apart() {
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(0.5, 0.0), true);
        let layout = ForceDirectedLayout::new(ForceDirectedConfig {
            repulsion_constant: 0.0,
            ..Default::default()
        });
        layout.step(&mut run);

        assert!(run.points()[0].position.x < 0.0);
        assert!(run.points()[1].position.x > 0.5);
    }

    #[test]
    fn test_forces_are_cleared_after_step() {
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(0.4, 0.3), true);
        ForceDirectedLayout::default().step(&mut run);
        for p in run.points() {
            assert_eq!(p.force, Vector2::zero());
        }
    }

    #[test]
    fn test_coincident_points_are_counted_not_propagated() {
        let mut run = two_point_run(Vector2::new(0.5, 0.5), Vector2::new(0.5, 0.5), true);
        let step = ForceDirectedLayout::default().step(&mut run);

        // one repulsion pair and one spring
        assert_eq!(step.coincident_pairs, 2);
        for p in run.points() {
            assert!(p.position.is_finite());
            assert_eq!(p.position, Vector2::new(0.5, 0.5));
        }
    }

    #[test]
    fn test_non_finite_position_update_is_rejected() {
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), false);
        run.points_mut()[0].velocity = Vector2::new(f64::NAN, 0.0);

        let step = ForceDirectedLayout::default().step(&mut run);
        assert_eq!(step.rejected_updates, 1);
        assert_eq!(run.points()[0].position, Vector2::new(0.0, 0.0));
        assert!(run.points()[1].position.x > 1.0);
    }

    #[test]
    fn test_run_stops_at_iteration_cap() {
        let mut run = SimulationRun::new();
        for i in 0..6 {
            run.add_point(Vector2::new(i as f64 * 0.1, (i % 2) as f64 * 0.1));
        }
        for i in 0..5 {
            run.add_spring(i, i + 1);
        }

        let stats = ForceDirectedLayout::default().run(&mut run);
        assert!(stats.iterations <= 10);
        assert_eq!(stats.energy_history.len(), stats.iterations as usize);
        assert_eq!(stats.energy_history.last().copied(), Some(stats.kinetic_energy));
    }

    #[test]
    fn test_run_stops_on_convergence() {
        // Far apart and unconnected: repulsion is tiny, energy stays under threshold.
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(1000.0, 0.0), false);
        let stats = ForceDirectedLayout::default().run(&mut run);

        assert_eq!(stats.iterations, 1);
        assert!(stats.converged);
        assert!(stats.kinetic_energy <= 0.01);
    }

    #[test]
    fn test_damping_decays_energy_without_forces() {
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(1.0e6, 0.0), false);
        run.points_mut()[0].velocity = Vector2::new(4.0, 0.0);

        let layout = ForceDirectedLayout::new(ForceDirectedConfig {
            repulsion_constant: 0.0,
            convergence_threshold: 0.0,
            ..Default::default()
        });
        let stats = layout.run(&mut run);

        assert_eq!(stats.iterations, 10);
        assert!(!stats.converged);
        for pair in stats.energy_history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_energy_builds_up_under_sustained_force() {
        // A long spring keeps pulling; damped velocity approaches f*dt from below.
        let mut run = two_point_run(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), true);
        let layout = ForceDirectedLayout::new(ForceDirectedConfig {
            max_iterations: 4,
            ..Default::default()
        });
        let stats = layout.run(&mut run);

        assert_eq!(stats.iterations, 4);
        let history = &stats.energy_history;
        assert!(history[2] > history[1]);
        assert!(history[3] > history[2]);
    }

    #[test]
    fn test_larger_budget_is_respected() {
        let mut run = SimulationRun::new();
        for i in 0..4 {
            run.add_point(Vector2::new((i as f64) * 0.25, (i as f64) * 0.1));
        }
        run.add_spring(0, 1);
        run.add_spring(2, 3);

        let layout = ForceDirectedLayout::new(ForceDirectedConfig {
            max_iterations: 1000,
            ..Default::default()
        });
        let stats = layout.run(&mut run);
        assert!(stats.iterations <= 1000);
        assert!(stats.converged || stats.iterations == 1000);
    }
}

//! Random graph generation.
//!
//! [`RandomGraphGenerator`] builds an Erdős–Rényi style topology (one
//! independent Bernoulli trial per unordered node pair), lays it out with the
//! force-directed engine, normalizes the result into the output frame and
//! wraps it in a [`GraphDocument`].
//!
//! The generator owns a seeded `StdRng`, so a given seed always produces the
//! same sequence of documents.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::document::GraphDocument;
use crate::error::{GraphError, Result};
use crate::layout::{
    normalize_positions, ForceDirectedConfig, ForceDirectedLayout, FrameConfig, LayoutStats,
    SimulationRun, Vector2,
};

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Document id (default: 0).
    pub graph_id: u32,
    /// Document title (default: "Random Graph").
    pub title: String,
    pub layout: ForceDirectedConfig,
    pub frame: FrameConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            graph_id: 0,
            title: "Random Graph".to_string(),
            layout: ForceDirectedConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

/// A generated document together with the diagnostics of its layout run.
#[derive(Debug, Clone)]
pub struct GeneratedGraph {
    pub document: GraphDocument,
    pub stats: LayoutStats,
}

pub struct RandomGraphGenerator {
    config: GeneratorConfig,
    layout: ForceDirectedLayout,
    rng: StdRng,
}

impl RandomGraphGenerator {
    /// Generator with the default configuration.
    pub fn new(seed: u64) -> Self {
        let config = GeneratorConfig::default();
        Self {
            layout: ForceDirectedLayout::new(config.layout.clone()),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_config(seed: u64, config: GeneratorConfig) -> Result<Self> {
        config.layout.validate()?;
        config.frame.validate()?;
        Ok(Self {
            layout: ForceDirectedLayout::new(config.layout.clone()),
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Create the points and springs of a random graph without simulating.
    ///
    /// Points start uniformly in `[0, 1)²`; each unordered pair `i < j` is
    /// connected with probability `connectivity`, in `(i, j)` order.
    pub fn build_topology(&mut self, node_count: usize, connectivity: f64) -> Result<SimulationRun> {
        validate_parameters(node_count, connectivity)?;

        let mut run = SimulationRun::with_capacity(node_count, 0);
        for _ in 0..node_count {
            let position = Vector2::new(self.rng.r#gen::<f64>(), self.rng.r#gen::<f64>());
            run.add_point(position);
        }

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                if self.rng.gen_bool(connectivity) {
                    run.add_spring(i, j);
                }
            }
        }

        Ok(run)
    }

    /// Generate, lay out and normalize a random graph.
    pub fn generate(&mut self, node_count: usize, connectivity: f64) -> Result<GraphDocument> {
        self.generate_with_stats(node_count, connectivity)
            .map(|generated| generated.document)
    }

    pub fn generate_with_stats(
        &mut self,
        node_count: usize,
        connectivity: f64,
    ) -> Result<GeneratedGraph> {
        let mut run = self.build_topology(node_count, connectivity)?;
        let stats = self.layout.run(&mut run);

        let positions: Vec<Vector2> = run.points().iter().map(|p| p.position).collect();
        let coordinates = normalize_positions(&positions, &self.config.frame)?;

        let frame = &self.config.frame;
        let mut document = GraphDocument::new(
            self.config.graph_id,
            self.config.title.clone(),
            frame.width,
            frame.height,
        );
        for (point, coordinate) in run.points().iter().zip(coordinates) {
            document.push_node(point.id, coordinate);
        }
        let points = run.points();
        for spring in run.springs() {
            document.push_edge(spring.id, points[spring.point_a].id, points[spring.point_b].id);
        }

        tracing::info!(
            nodes = document.node_count(),
            edges = document.edge_count(),
            connectivity,
            iterations = stats.iterations,
            "generated random graph"
        );

        Ok(GeneratedGraph { document, stats })
    }
}

/// Reject requests before any simulation work is done.
pub fn validate_parameters(node_count: usize, connectivity: f64) -> Result<()> {
    if node_count == 0 {
        return Err(GraphError::invalid("nodeCount", "must be positive, got 0"));
    }
    if u32::try_from(node_count).is_err() {
        return Err(GraphError::invalid(
            "nodeCount",
            format!("{node_count} exceeds the 32-bit id space"),
        ));
    }
    if !(0.0..=1.0).contains(&connectivity) {
        return Err(GraphError::invalid(
            "connectivity",
            format!("must lie in [0, 1], got {connectivity}"),
        ));
    }
    Ok(())
}

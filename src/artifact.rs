//! Persisted record of a finished refinement run.
//!
//! Only successful runs produce an artifact. The JSON layout is the contract
//! with downstream plotting and reporting tools.

use crate::config::RefinementConfig;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::modularity::{scaled_modularity, Assignment};
use crate::refine::{IterationRecord, RefinementOutcome, StopReason, SubsetMethod};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Everything needed to reproduce or plot a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    /// Graph identifier (file name or generator description).
    pub graph: Option<String>,
    /// Number of vertices.
    pub n_vertices: usize,
    /// Total edge weight `m`.
    pub total_weight: f64,
    /// Best raw modularity `sᵀ B s`.
    pub best_modularity: f64,
    /// Best modularity scaled by `1 / (4m)`.
    pub best_modularity_scaled: f64,
    /// Best assignment found.
    pub best_assignment: Assignment,
    /// Reference optimum (raw), if one was known.
    pub optimal_modularity: Option<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// Per-iteration history.
    pub history: Vec<IterationRecord>,
    /// Exit condition.
    pub stop_reason: StopReason,
    /// Random seed.
    pub seed: u64,
    /// Subset selection strategy.
    pub subset_method: SubsetMethod,
    /// Subproblem size.
    pub iter_size: usize,
    /// Stagnation limit.
    pub stopping_criteria: usize,
    /// Subproblem solver identifier.
    pub solver: String,
}

impl RunArtifact {
    /// Assemble the artifact of a finished run.
    pub fn new(
        outcome: RefinementOutcome,
        config: &RefinementConfig,
        graph: &Graph,
        graph_name: Option<String>,
        solver: &str,
    ) -> Self {
        let total_weight = graph.total_weight();
        Self {
            graph: graph_name,
            n_vertices: graph.node_count(),
            total_weight,
            best_modularity: outcome.best_modularity,
            best_modularity_scaled: scaled_modularity(outcome.best_modularity, total_weight),
            best_assignment: outcome.best_assignment,
            optimal_modularity: config.known_optimal,
            iterations: outcome.iterations,
            history: outcome.history,
            stop_reason: outcome.stop_reason,
            seed: config.seed,
            subset_method: config.subset_method,
            iter_size: config.iter_size,
            stopping_criteria: config.stopping_criteria,
            solver: solver.to_string(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(format!("artifact: {e}")))
    }

    /// Parse an artifact back.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Other(format!("artifact: {e}")))
    }

    /// Write JSON to a new file. An existing file is never overwritten.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| Error::Other(format!("{}: {e}", path.display())))?;
        file.write_all(json.as_bytes())
            .map_err(|e| Error::Other(format!("{}: {e}", path.display())))
    }
}

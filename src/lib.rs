//! # modsplit
//!
//! Two-way modularity maximization by local refinement.
//!
//! Exhaustive search is exact but only feasible for a couple dozen vertices.
//! Larger graphs are split by repeatedly re-optimizing a bounded-size subset
//! of vertices (chosen around a high-gain pivot) while the rest of the graph
//! stays fixed, accepting each update only if it improves global modularity.
//! The subproblem solver is pluggable; exact enumeration is built in.

/// Persisted run artifact.
pub mod artifact;
/// Run configuration.
pub mod config;
/// Error types used across `modsplit`.
pub mod error;
pub mod generators;
pub mod graph;
pub mod modularity;
pub mod refine;

#[cfg(test)]
mod refinement_tests;

pub use artifact::RunArtifact;
pub use config::RefinementConfig;
pub use error::{Error, Result};
pub use graph::Graph;
pub use modularity::{evaluate, modularity_matrix, scaled_modularity, Assignment, ModularityMatrix};
pub use refine::{
    optimal_assignment, ExactSubsetSolver, GainEstimator, IterationRecord, RefinementOutcome,
    SingleLevelRefinement, StopReason, Subproblem, SubproblemSolver, SubsetMethod, SubsetSelector,
};

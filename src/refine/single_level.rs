//! Single-level local refinement of a two-way split.
//!
//! ## The Loop
//!
//! Starting from a seeded random assignment, every iteration:
//!
//! 1. computes the flip gain of every vertex,
//! 2. picks the unvisited maximum-gain vertex as pivot and grows a subset
//!    around it,
//! 3. re-optimizes the subset with a [`SubproblemSolver`] while every other
//!    vertex keeps its side,
//! 4. accepts the merged candidate only if it strictly improves modularity.
//!
//! The best assignment seen is kept separately from the current one.
//!
//! ## Stopping
//!
//! The run ends when every vertex has served as pivot, when more than
//! `stopping_criteria` consecutive iterations fail to improve, or when a
//! known reference optimum is supplied and the best score reaches
//! `early_exit_ratio` of it. Since each iteration consumes a new pivot, a run
//! never exceeds `n` iterations.

use super::exact::ExactSubsetSolver;
use super::gain::GainEstimator;
use super::select::SubsetSelector;
use super::traits::{Subproblem, SubproblemSolver};
use crate::config::RefinementConfig;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::modularity::{Assignment, ModularityMatrix};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// One row of the run history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration index.
    pub iteration: usize,
    /// Raw modularity of this iteration's candidate.
    pub candidate_modularity: f64,
    /// Best raw modularity after this iteration.
    pub best_modularity: f64,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every vertex has been used as a pivot.
    AllVisited,
    /// The best score reached the configured fraction of the known optimum.
    ReachedReference,
    /// Too many consecutive non-improving iterations.
    Stagnated,
}

/// Result of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementOutcome {
    /// Best raw modularity `sᵀ B s` found.
    pub best_modularity: f64,
    /// Assignment achieving `best_modularity`.
    pub best_assignment: Assignment,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Per-iteration record, in order.
    pub history: Vec<IterationRecord>,
    /// Exit condition.
    pub stop_reason: StopReason,
}

/// Local-search refinement driver.
#[derive(Debug, Clone)]
pub struct SingleLevelRefinement {
    config: RefinementConfig,
}

impl SingleLevelRefinement {
    /// Create a refinement driver; the configuration is validated here.
    pub fn new(config: RefinementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Refine with the exact enumeration solver.
    pub fn run(&self, graph: &Graph) -> Result<RefinementOutcome> {
        self.run_with_solver(graph, &ExactSubsetSolver::new())
    }

    /// Refine from a seeded random assignment using `solver` for subproblems.
    pub fn run_with_solver<S>(&self, graph: &Graph, solver: &S) -> Result<RefinementOutcome>
    where
        S: SubproblemSolver + ?Sized,
    {
        let model = ModularityMatrix::from_graph(graph)?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let initial = Assignment::random(graph.node_count(), &mut rng);
        self.refine(graph, &model, initial, solver)
    }

    /// Refine starting from a caller-supplied assignment (`{-1, +1}` or `{0, 1}`).
    pub fn run_from<S>(&self, graph: &Graph, initial: &[i8], solver: &S) -> Result<RefinementOutcome>
    where
        S: SubproblemSolver + ?Sized,
    {
        let model = ModularityMatrix::from_graph(graph)?;
        let initial = Assignment::from_encoded_with_len(initial, graph.node_count())?;
        self.refine(graph, &model, initial, solver)
    }

    fn refine<S>(
        &self,
        graph: &Graph,
        model: &ModularityMatrix,
        initial: Assignment,
        solver: &S,
    ) -> Result<RefinementOutcome>
    where
        S: SubproblemSolver + ?Sized,
    {
        let n = graph.node_count();
        let cfg = &self.config;
        let selector = SubsetSelector::new(graph, cfg.subset_method, cfg.iter_size)?;
        let estimator = GainEstimator::new();

        let mut current = initial;
        let mut current_q = model.evaluate(&current)?;
        let mut best = current.clone();
        let mut best_q = current_q;
        info!(
            "refining {n} vertices with {} subsets of {} via {} solver; initial {current_q}, reference {:?}",
            cfg.subset_method,
            cfg.iter_size,
            solver.name(),
            cfg.known_optimal
        );

        let mut visited = vec![false; n];
        let mut iteration = 0;
        let mut stuck = 0;
        let mut history = Vec::new();

        let stop_reason = loop {
            if stuck > cfg.stopping_criteria {
                break StopReason::Stagnated;
            }

            let gains = estimator.compute(model, &current)?;
            let Some(selection) = selector.select(&gains, &visited)? else {
                break StopReason::AllVisited;
            };
            visited[selection.pivot] = true;
            iteration += 1;
            let subset = selection.subset;
            info!(
                "iteration {iteration}: pivot {} (gain {}), subset {subset:?}",
                selection.pivot, gains[selection.pivot]
            );

            let problem = Subproblem::extract(model, &current, &subset)?;
            let raw = solver.solve(&problem).map_err(|e| Error::Subproblem {
                solver: solver.name().to_string(),
                iteration,
                subset: subset.clone(),
                returned: Vec::new(),
                reason: e.to_string(),
            })?;
            let local = Assignment::from_encoded_with_len(&raw, subset.len()).map_err(|e| {
                Error::Subproblem {
                    solver: solver.name().to_string(),
                    iteration,
                    subset: subset.clone(),
                    returned: raw.clone(),
                    reason: e.to_string(),
                }
            })?;

            let candidate = current.merged(&subset, &local)?;
            let candidate_q = model.evaluate(&candidate)?;
            debug!("iteration {iteration}: candidate {candidate_q}, current {current_q}");

            if candidate_q > current_q {
                current = candidate;
                current_q = candidate_q;
                stuck = 0;
            } else {
                stuck += 1;
            }
            if current_q > best_q {
                best = current.clone();
                best_q = current_q;
            }

            history.push(IterationRecord {
                iteration,
                candidate_modularity: candidate_q,
                best_modularity: best_q,
            });
            info!(
                "iteration {iteration}: candidate {candidate_q}, best {best_q} (scaled {})",
                model.scaled(best_q)
            );

            if let Some(optimal) = cfg.known_optimal {
                if best_q >= cfg.early_exit_ratio * optimal {
                    info!("reached {} of reference optimum at iteration {iteration}", cfg.early_exit_ratio);
                    break StopReason::ReachedReference;
                }
            }
        };

        info!(
            "stopped after {iteration} iterations ({stop_reason:?}); best {best_q} (scaled {})",
            model.scaled(best_q)
        );
        Ok(RefinementOutcome {
            best_modularity: best_q,
            best_assignment: best,
            iterations: iteration,
            history,
            stop_reason,
        })
    }
}

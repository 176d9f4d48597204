//! Run configuration.

use crate::error::{Error, Result};
use crate::modularity::{Assignment, ModularityMatrix};
use crate::refine::SubsetMethod;
use serde::{Deserialize, Serialize};

/// Immutable configuration of one refinement run.
///
/// Everything that influences the result lives here, including the seed of
/// the run's own random generator, so two runs with equal configs on the
/// same graph are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefinementConfig {
    /// Seed for the initial random assignment.
    pub seed: u64,
    /// Maximum number of vertices per subproblem.
    pub iter_size: usize,
    /// Subset selection strategy.
    pub subset_method: SubsetMethod,
    /// Consecutive non-improving iterations tolerated before stopping.
    pub stopping_criteria: usize,
    /// Known optimal raw modularity, for benchmark graphs with a planted split.
    pub known_optimal: Option<f64>,
    /// Stop once `best >= early_exit_ratio * known_optimal`.
    pub early_exit_ratio: f64,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iter_size: 12,
            subset_method: SubsetMethod::Spectral,
            stopping_criteria: 3,
            known_optimal: None,
            early_exit_ratio: 0.95,
        }
    }
}

impl RefinementConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the subproblem size.
    pub fn with_iter_size(mut self, iter_size: usize) -> Self {
        self.iter_size = iter_size;
        self
    }

    /// Set the subset selection strategy.
    pub fn with_subset_method(mut self, method: SubsetMethod) -> Self {
        self.subset_method = method;
        self
    }

    /// Set the stagnation limit.
    pub fn with_stopping_criteria(mut self, stopping_criteria: usize) -> Self {
        self.stopping_criteria = stopping_criteria;
        self
    }

    /// Set the known optimal raw modularity.
    pub fn with_known_optimal(mut self, optimal: f64) -> Self {
        self.known_optimal = Some(optimal);
        self
    }

    /// Use the modularity of a known (planted) split as the reference optimum.
    pub fn with_reference_assignment(
        mut self,
        model: &ModularityMatrix,
        reference: &Assignment,
    ) -> Result<Self> {
        self.known_optimal = Some(model.evaluate(reference)?);
        Ok(self)
    }

    /// Set the early-exit ratio.
    pub fn with_early_exit_ratio(mut self, ratio: f64) -> Self {
        self.early_exit_ratio = ratio;
        self
    }

    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::Other(format!("config: {e}")))?;
        // Surface a bad strategy name as such, not as a generic parse failure.
        if let Some(name) = value.get("subset_method").and_then(serde_json::Value::as_str) {
            let _: SubsetMethod = name.parse()?;
        }
        let config: Self =
            serde_json::from_value(value).map_err(|e| Error::Other(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.iter_size == 0 {
            return Err(Error::InvalidParameter {
                name: "iter_size",
                message: "must be at least 1".into(),
            });
        }
        if !self.early_exit_ratio.is_finite() || self.early_exit_ratio <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "early_exit_ratio",
                message: format!("must be finite and positive, got {}", self.early_exit_ratio),
            });
        }
        if let Some(opt) = self.known_optimal {
            if !opt.is_finite() {
                return Err(Error::InvalidParameter {
                    name: "known_optimal",
                    message: format!("must be finite, got {opt}"),
                });
            }
        }
        Ok(())
    }
}

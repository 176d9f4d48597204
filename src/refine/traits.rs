//! Subproblem solver contract.

use crate::error::{Error, Result};
use crate::modularity::{Assignment, ModularityMatrix};
use ndarray::{Array1, Array2, Axis};

/// A bounded-size subset of vertices re-optimized with everything else held fixed.
///
/// With `F` the fixed vertices, maximizing global modularity over the subset
/// is equivalent to maximizing
///
/// ```text
/// sᵀ B_sub s + Cᵀ s,    C_i = Σ_{j ∈ F} 2 B_ij s_j
/// ```
#[derive(Debug, Clone)]
pub struct Subproblem {
    vertices: Vec<usize>,
    matrix: Array2<f64>,
    bias: Array1<f64>,
}

impl Subproblem {
    /// Extract the subproblem for `subset` given the current global assignment.
    pub fn extract(
        model: &ModularityMatrix,
        assignment: &Assignment,
        subset: &[usize],
    ) -> Result<Self> {
        let n = model.dim();
        if assignment.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: assignment.len(),
            });
        }
        let mut in_subset = vec![false; n];
        for &v in subset {
            if v >= n {
                return Err(Error::InvalidParameter {
                    name: "subset",
                    message: format!("vertex {v} outside 0..{n}"),
                });
            }
            if in_subset[v] {
                return Err(Error::InvalidParameter {
                    name: "subset",
                    message: format!("vertex {v} listed twice"),
                });
            }
            in_subset[v] = true;
        }

        let b = model.matrix();
        let matrix = b.select(Axis(0), subset).select(Axis(1), subset);
        let bias = subset
            .iter()
            .map(|&i| {
                (0..n)
                    .filter(|&j| !in_subset[j])
                    .map(|j| 2.0 * b[[i, j]] * f64::from(assignment.spin(j)))
                    .sum::<f64>()
            })
            .collect();

        Ok(Self {
            vertices: subset.to_vec(),
            matrix,
            bias,
        })
    }

    /// Build a subproblem directly from a matrix and bias (local ids `0..k`).
    pub fn from_parts(matrix: Array2<f64>, bias: Array1<f64>) -> Result<Self> {
        let k = matrix.nrows();
        if matrix.ncols() != k {
            return Err(Error::DimensionMismatch {
                expected: k,
                found: matrix.ncols(),
            });
        }
        if bias.len() != k {
            return Err(Error::DimensionMismatch {
                expected: k,
                found: bias.len(),
            });
        }
        Ok(Self {
            vertices: (0..k).collect(),
            matrix,
            bias,
        })
    }

    /// Subset size `k`.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True for an empty subset.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Global vertex ids, in local order.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// `B_sub`, the `k × k` block of the modularity matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// `C`, the contribution of the fixed vertices.
    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    /// Local objective `sᵀ B_sub s + Cᵀ s`.
    pub fn objective(&self, local: &Assignment) -> Result<f64> {
        if local.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                found: local.len(),
            });
        }
        let x = local.to_array();
        Ok(x.dot(&self.matrix.dot(&x)) + self.bias.dot(&x))
    }
}

/// Anything that can (approximately) maximize a [`Subproblem`].
///
/// The refinement loop only needs this one synchronous call. Implementations
/// may be exact enumeration, a MIP model, an annealer or any other heuristic;
/// solver-specific parameters live on the implementing type.
///
/// The returned vector has length `k` with entries in `{-1, +1}` or `{0, 1}`.
/// Anything else is rejected by the caller as a malformed solution.
pub trait SubproblemSolver {
    /// Solve one subproblem.
    fn solve(&self, problem: &Subproblem) -> Result<Vec<i8>>;

    /// Short identifier recorded in run artifacts.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<S: SubproblemSolver + ?Sized> SubproblemSolver for &S {
    fn solve(&self, problem: &Subproblem) -> Result<Vec<i8>> {
        (**self).solve(problem)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: SubproblemSolver + ?Sized> SubproblemSolver for Box<S> {
    fn solve(&self, problem: &Subproblem) -> Result<Vec<i8>> {
        (**self).solve(problem)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

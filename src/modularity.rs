//! Modularity matrix and the two-way modularity objective.
//!
//! For a graph with adjacency `A`, weighted degrees `k` and total edge
//! weight `m`, the modularity matrix is
//!
//! ```text
//! B_ij = A_ij - k_i k_j / (2m)
//! ```
//!
//! and a two-way split encoded as spins `s ∈ {-1, +1}^n` scores
//!
//! ```text
//! Q(s) = sᵀ B s  (+ Cᵀ s when a bias vector is supplied)
//! ```
//!
//! `Q(s) / (4m)` is the usual normalized modularity in `[-1/2, 1]`; the
//! raw form is what the refinement loop compares, the scaled form is what
//! gets reported.

use crate::error::{Error, Result};
use crate::graph::Graph;
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A two-way community assignment with one spin in `{-1, +1}` per vertex.
///
/// This is the only representation used inside the algorithms. Every
/// external encoding goes through [`Assignment::from_encoded`] exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i8>", into = "Vec<i8>")]
pub struct Assignment(Vec<i8>);

impl Assignment {
    /// Normalize an externally encoded assignment.
    ///
    /// Accepts `{-1, +1}` and `{0, 1}` entries, remapping `0 → -1`.
    pub fn from_encoded(values: &[i8]) -> Result<Self> {
        let spins = values
            .iter()
            .enumerate()
            .map(|(index, &value)| match value {
                0 | -1 => Ok(-1),
                1 => Ok(1),
                _ => Err(Error::InvalidAssignment { index, value }),
            })
            .collect::<Result<Vec<i8>>>()?;
        Ok(Self(spins))
    }

    /// Normalize and check the length against the vertex count.
    pub fn from_encoded_with_len(values: &[i8], n: usize) -> Result<Self> {
        if values.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: values.len(),
            });
        }
        Self::from_encoded(values)
    }

    /// Wrap spins already known to be `±1`.
    pub(crate) fn from_spins(spins: Vec<i8>) -> Self {
        debug_assert!(spins.iter().all(|&s| s == 1 || s == -1));
        Self(spins)
    }

    /// Uniformly random assignment.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        Self((0..n).map(|_| if rng.random_bool(0.5) { 1 } else { -1 }).collect())
    }

    /// Every vertex on the same side.
    pub fn uniform(n: usize, positive: bool) -> Self {
        Self(vec![if positive { 1 } else { -1 }; n])
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the assignment of the empty graph.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Spin of vertex `v`.
    pub fn spin(&self, v: usize) -> i8 {
        self.0[v]
    }

    /// Spins as a slice.
    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }

    /// Copy with vertex `v` moved to the other side.
    pub fn flipped(&self, v: usize) -> Self {
        let mut spins = self.0.clone();
        spins[v] = -spins[v];
        Self(spins)
    }

    /// Copy with every spin negated (the same split, other labelling).
    pub fn negated(&self) -> Self {
        Self(self.0.iter().map(|&s| -s).collect())
    }

    /// Copy with the entries at `subset` overwritten by `local`.
    pub fn merged(&self, subset: &[usize], local: &Assignment) -> Result<Self> {
        if subset.len() != local.len() {
            return Err(Error::DimensionMismatch {
                expected: subset.len(),
                found: local.len(),
            });
        }
        let mut spins = self.0.clone();
        for (&v, &s) in subset.iter().zip(local.as_slice()) {
            spins[v] = s;
        }
        Ok(Self(spins))
    }

    /// Spins as floating point, for matrix products.
    pub fn to_array(&self) -> Array1<f64> {
        self.0.iter().map(|&s| f64::from(s)).collect()
    }

    /// Vertex ids on the `+1` side.
    pub fn positive_side(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > 0)
            .map(|(v, _)| v)
            .collect()
    }
}

impl TryFrom<Vec<i8>> for Assignment {
    type Error = Error;

    fn try_from(values: Vec<i8>) -> Result<Self> {
        Self::from_encoded(&values)
    }
}

impl From<Assignment> for Vec<i8> {
    fn from(assignment: Assignment) -> Self {
        assignment.0
    }
}

/// Compute `B_ij = A_ij - k_i k_j / (2m)` for a graph.
///
/// A graph without edges yields the zero matrix.
pub fn modularity_matrix(graph: &Graph) -> Array2<f64> {
    let n = graph.node_count();
    let mut b = graph.adjacency_matrix();
    let two_m = 2.0 * graph.total_weight();
    if two_m == 0.0 {
        return b;
    }
    let k = graph.degrees();
    for i in 0..n {
        for j in 0..n {
            b[[i, j]] -= k[i] * k[j] / two_m;
        }
    }
    b
}

/// Normalize a raw score by `1 / (4m)`, `m` the total edge weight.
///
/// Zero for an edgeless graph.
pub fn scaled_modularity(raw: f64, total_weight: f64) -> f64 {
    if total_weight == 0.0 {
        0.0
    } else {
        raw / (4.0 * total_weight)
    }
}

/// Evaluate `sᵀ B s (+ Cᵀ s)` for an externally encoded assignment.
///
/// The assignment goes through the `{0, 1} → {-1, +1}` normalization and is
/// checked against the dimension of `b` (and of `bias`, if given).
pub fn evaluate(b: &Array2<f64>, assignment: &[i8], bias: Option<&Array1<f64>>) -> Result<f64> {
    let s = Assignment::from_encoded_with_len(assignment, b.nrows())?;
    quadratic_form(b, &s, bias)
}

fn quadratic_form(b: &Array2<f64>, s: &Assignment, bias: Option<&Array1<f64>>) -> Result<f64> {
    if b.nrows() != b.ncols() {
        return Err(Error::DimensionMismatch {
            expected: b.nrows(),
            found: b.ncols(),
        });
    }
    if s.len() != b.nrows() {
        return Err(Error::DimensionMismatch {
            expected: b.nrows(),
            found: s.len(),
        });
    }
    let x = s.to_array();
    let mut score = x.dot(&b.dot(&x));
    if let Some(c) = bias {
        if c.len() != x.len() {
            return Err(Error::DimensionMismatch {
                expected: x.len(),
                found: c.len(),
            });
        }
        score += c.dot(&x);
    }
    Ok(score)
}

/// The modularity matrix of one graph, shared read-only for a whole run.
#[derive(Debug, Clone)]
pub struct ModularityMatrix {
    b: Array2<f64>,
    total_weight: f64,
}

impl ModularityMatrix {
    /// Build the modularity matrix of `graph`.
    pub fn from_graph(graph: &Graph) -> Result<Self> {
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }
        Ok(Self {
            b: modularity_matrix(graph),
            total_weight: graph.total_weight(),
        })
    }

    /// Wrap a precomputed square matrix. `total_weight` is `m`, used for scaling.
    pub fn from_matrix(b: Array2<f64>, total_weight: f64) -> Result<Self> {
        if b.nrows() == 0 {
            return Err(Error::EmptyInput);
        }
        if b.nrows() != b.ncols() {
            return Err(Error::DimensionMismatch {
                expected: b.nrows(),
                found: b.ncols(),
            });
        }
        Ok(Self { b, total_weight })
    }

    /// Number of vertices.
    pub fn dim(&self) -> usize {
        self.b.nrows()
    }

    /// The matrix `B`.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.b
    }

    /// Total edge weight `m` of the source graph.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Raw modularity `sᵀ B s`.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<f64> {
        quadratic_form(&self.b, assignment, None)
    }

    /// Raw modularity plus a linear term, `sᵀ B s + Cᵀ s`.
    pub fn evaluate_with_bias(&self, assignment: &Assignment, bias: &Array1<f64>) -> Result<f64> {
        quadratic_form(&self.b, assignment, Some(bias))
    }

    /// Raw modularity of an externally encoded assignment.
    pub fn evaluate_encoded(&self, assignment: &[i8]) -> Result<f64> {
        evaluate(&self.b, assignment, None)
    }

    /// Normalize a raw score by `1 / (4m)`.
    pub fn scaled(&self, raw: f64) -> f64 {
        scaled_modularity(raw, self.total_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles {0,1,2} and {3,4,5} joined by the edge (2,3).
    fn two_triangles() -> Graph {
        Graph::from_unweighted_edges(6, &[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (3, 5)])
            .unwrap()
    }

    #[test]
    fn test_modularity_matrix_entries() {
        let b = modularity_matrix(&two_triangles());
        // k = [2, 2, 3, 3, 2, 2], 2m = 14
        assert!((b[[0, 1]] - (1.0 - 4.0 / 14.0)).abs() < 1e-12);
        assert!((b[[2, 3]] - (1.0 - 9.0 / 14.0)).abs() < 1e-12);
        assert!((b[[0, 5]] - (-4.0 / 14.0)).abs() < 1e-12);
        assert!((b[[2, 2]] - (-9.0 / 14.0)).abs() < 1e-12);
        for i in 0..6 {
            let row_sum: f64 = b.row(i).sum();
            assert!(row_sum.abs() < 1e-12, "rows of B sum to zero");
        }
    }

    #[test]
    fn test_evaluate_matches_hand_computation() {
        let model = ModularityMatrix::from_graph(&two_triangles()).unwrap();
        let split = Assignment::from_encoded(&[-1, -1, -1, 1, 1, 1]).unwrap();
        // sᵀAs = 2 (6 internal - 1 crossing) = 10, Σ k_i s_i = 0
        let q = model.evaluate(&split).unwrap();
        assert!((q - 10.0).abs() < 1e-10);
        assert!((model.scaled(q) - 5.0 / 14.0).abs() < 1e-12);

        let all_one = Assignment::uniform(6, true);
        assert!(model.evaluate(&all_one).unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_evaluate_with_bias() {
        let model = ModularityMatrix::from_graph(&two_triangles()).unwrap();
        let s = Assignment::from_encoded(&[1, 1, 1, 1, 1, -1]).unwrap();
        let c = Array1::from(vec![1.0, 0.0, 0.0, 0.0, 0.0, 2.0]);
        let plain = model.evaluate(&s).unwrap();
        let biased = model.evaluate_with_bias(&s, &c).unwrap();
        assert!((biased - (plain + 1.0 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_binary_encoding_is_remapped() {
        let model = ModularityMatrix::from_graph(&two_triangles()).unwrap();
        let a = model.evaluate_encoded(&[0, 0, 0, 1, 1, 1]).unwrap();
        let b = model.evaluate_encoded(&[-1, -1, -1, 1, 1, 1]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_assignment_rejected() {
        assert_eq!(
            Assignment::from_encoded(&[1, 2, -1]),
            Err(Error::InvalidAssignment { index: 1, value: 2 })
        );
        assert_eq!(
            Assignment::from_encoded(&[0, -1, 1]).unwrap().as_slice(),
            &[-1, -1, 1]
        );
        let b = modularity_matrix(&two_triangles());
        assert_eq!(
            evaluate(&b, &[1, -1], None),
            Err(Error::DimensionMismatch { expected: 6, found: 2 })
        );
    }

    #[test]
    fn test_edgeless_graph() {
        let g = Graph::from_unweighted_edges(3, &[]).unwrap();
        let model = ModularityMatrix::from_graph(&g).unwrap();
        assert!(model.matrix().iter().all(|&x| x == 0.0));
        assert_eq!(model.scaled(0.0), 0.0);
    }

    #[test]
    fn test_empty_graph_is_error() {
        let g = Graph::from_unweighted_edges(0, &[]).unwrap();
        assert_eq!(ModularityMatrix::from_graph(&g).unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn test_assignment_serde_validates() {
        let s: Assignment = serde_json::from_str("[0, 1, 1]").unwrap();
        assert_eq!(s.as_slice(), &[-1, 1, 1]);
        assert!(serde_json::from_str::<Assignment>("[3]").is_err());
        assert_eq!(serde_json::to_string(&s).unwrap(), "[-1,1,1]");
    }
}

//! Exhaustive search over all `2^k` spin assignments of a subproblem.
//!
//! The search space is ordered lexicographically over `(s_0, …, s_{k-1})`
//! with `-1` before `+1`; configuration `x ∈ 0..2^k` sets `s_i = +1` iff bit
//! `k-1-i` of `x` is one. The space is split into `2^p` contiguous prefix
//! blocks, one per worker. Each worker keeps the first strict maximum of its
//! block and the reduction keeps the first strict maximum across blocks in
//! prefix order, so the answer is always the first maximum of the whole
//! enumeration regardless of the number of threads.

use super::traits::{Subproblem, SubproblemSolver};
use crate::error::{Error, Result};
use crate::modularity::{Assignment, ModularityMatrix};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

/// Largest subset the enumeration accepts.
pub const MAX_EXACT_SUBSET: usize = 30;

/// Upper bound on prefix bits, i.e. at most 16 workers.
const MAX_PREFIX_BITS: u32 = 4;

/// Brute-force subproblem solver. Ground truth for small `k`.
#[derive(Debug, Clone)]
pub struct ExactSubsetSolver {
    /// Overrides the worker count derived from the rayon pool.
    workers: Option<usize>,
}

impl ExactSubsetSolver {
    /// Create a solver that sizes its fan-out from the current rayon pool.
    pub fn new() -> Self {
        Self { workers: None }
    }

    /// Fix the number of workers used to derive the prefix length.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    fn prefix_bits(&self, k: usize) -> u32 {
        let workers = self.workers.unwrap_or_else(rayon::current_num_threads).max(1);
        workers.ilog2().min(MAX_PREFIX_BITS).min(k as u32)
    }

    /// Maximize `sᵀ B s + Cᵀ s` over all spin vectors.
    ///
    /// Returns the optimal score and the first optimal assignment in
    /// enumeration order.
    pub fn solve_exact(&self, b: &Array2<f64>, c: &Array1<f64>) -> Result<(f64, Assignment)> {
        let k = b.nrows();
        if b.ncols() != k {
            return Err(Error::DimensionMismatch {
                expected: k,
                found: b.ncols(),
            });
        }
        if c.len() != k {
            return Err(Error::DimensionMismatch {
                expected: k,
                found: c.len(),
            });
        }
        if k > MAX_EXACT_SUBSET {
            return Err(Error::InvalidParameter {
                name: "subset size",
                message: format!("exact enumeration supports at most {MAX_EXACT_SUBSET} vertices, got {k}"),
            });
        }

        let p = self.prefix_bits(k);
        let suffix_bits = k as u32 - p;
        let blocks: Vec<(f64, u64)> = (0..1u64 << p)
            .into_par_iter()
            .map(|prefix| scan_block(b, c, k, prefix << suffix_bits, 1u64 << suffix_bits))
            .collect();

        let mut best = blocks[0];
        for &candidate in &blocks[1..] {
            if candidate.0 > best.0 {
                best = candidate;
            }
        }
        Ok((best.0, decode(best.1, k)))
    }
}

impl Default for ExactSubsetSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SubproblemSolver for ExactSubsetSolver {
    fn solve(&self, problem: &Subproblem) -> Result<Vec<i8>> {
        let (_, assignment) = self.solve_exact(problem.matrix(), problem.bias())?;
        Ok(assignment.into())
    }

    fn name(&self) -> &str {
        "exact"
    }
}

/// Exact two-way optimum of a whole (small) graph: `max_s sᵀ B s`.
pub fn optimal_assignment(model: &ModularityMatrix) -> Result<(f64, Assignment)> {
    let zero = Array1::zeros(model.dim());
    ExactSubsetSolver::new().solve_exact(model.matrix(), &zero)
}

/// Scan `count` consecutive configurations starting at `start`.
fn scan_block(b: &Array2<f64>, c: &Array1<f64>, k: usize, start: u64, count: u64) -> (f64, u64) {
    let mut spins = vec![0.0; k];
    let mut best = (f64::NEG_INFINITY, start);
    for x in start..start + count {
        for (i, s) in spins.iter_mut().enumerate() {
            *s = if (x >> (k - 1 - i)) & 1 == 1 { 1.0 } else { -1.0 };
        }
        let score = score(b, c, &spins);
        if score > best.0 {
            best = (score, x);
        }
    }
    best
}

fn score(b: &Array2<f64>, c: &Array1<f64>, s: &[f64]) -> f64 {
    let mut total = 0.0;
    for (i, &si) in s.iter().enumerate() {
        let row = b.row(i);
        let mut field = 0.0;
        for (j, &sj) in s.iter().enumerate() {
            field += row[j] * sj;
        }
        total += si * field + c[i] * si;
    }
    total
}

fn decode(x: u64, k: usize) -> Assignment {
    Assignment::from_spins(
        (0..k)
            .map(|i| if (x >> (k - 1 - i)) & 1 == 1 { 1 } else { -1 })
            .collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::modularity::modularity_matrix;
    use proptest::prelude::*;

    fn two_triangles() -> Graph {
        Graph::from_unweighted_edges(6, &[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (3, 5)])
            .unwrap()
    }

    /// Independent reference: evaluate every configuration through the model.
    fn brute_reference(b: &Array2<f64>, c: &Array1<f64>) -> f64 {
        let k = b.nrows();
        let mut best = f64::NEG_INFINITY;
        for x in 0..(1u64 << k) {
            let s: Array1<f64> = (0..k)
                .map(|i| if (x >> i) & 1 == 1 { 1.0 } else { -1.0 })
                .collect();
            let q = s.dot(&b.dot(&s)) + c.dot(&s);
            best = best.max(q);
        }
        best
    }

    #[test]
    fn test_two_triangles_optimum() {
        let model = ModularityMatrix::from_graph(&two_triangles()).unwrap();
        let (score, s) = optimal_assignment(&model).unwrap();
        assert_eq!(s.as_slice(), &[-1, -1, -1, 1, 1, 1]);
        assert!((score - 10.0).abs() < 1e-10);
        assert!((model.scaled(score) - 5.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_triangles_optimum_unique_up_to_flip() {
        let model = ModularityMatrix::from_graph(&two_triangles()).unwrap();
        let (best, s) = optimal_assignment(&model).unwrap();
        for x in 0..64u64 {
            let cand = decode(x, 6);
            let q = model.evaluate(&cand).unwrap();
            if (q - best).abs() < 1e-9 {
                assert!(cand == s || cand == s.negated(), "unexpected optimum {:?}", cand);
            }
        }
    }

    #[test]
    fn test_result_independent_of_worker_count() {
        let b = modularity_matrix(&two_triangles());
        let c = Array1::from(vec![0.3, -0.1, 0.0, 0.2, -0.4, 0.05]);
        let single = ExactSubsetSolver::new().with_workers(1).solve_exact(&b, &c).unwrap();
        for workers in [2, 3, 4, 8, 16, 64] {
            let multi = ExactSubsetSolver::new()
                .with_workers(workers)
                .solve_exact(&b, &c)
                .unwrap();
            assert_eq!(single, multi);
        }
    }

    #[test]
    fn test_tie_break_is_first_in_enumeration() {
        // Zero objective: every configuration ties, the all-negative one comes first.
        let b = Array2::zeros((3, 3));
        let c = Array1::zeros(3);
        let (score, s) = ExactSubsetSolver::new().with_workers(4).solve_exact(&b, &c).unwrap();
        assert_eq!(score, 0.0);
        assert_eq!(s.as_slice(), &[-1, -1, -1]);
    }

    #[test]
    fn test_empty_and_oversized_subsets() {
        let solver = ExactSubsetSolver::new();
        let (score, s) = solver.solve_exact(&Array2::zeros((0, 0)), &Array1::zeros(0)).unwrap();
        assert_eq!(score, 0.0);
        assert!(s.is_empty());

        let k = MAX_EXACT_SUBSET + 1;
        assert!(matches!(
            solver.solve_exact(&Array2::zeros((k, k)), &Array1::zeros(k)),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(solver.solve_exact(&Array2::zeros((2, 2)), &Array1::zeros(3)).is_err());
    }

    #[test]
    fn test_solver_trait_returns_spins() {
        let b = modularity_matrix(&two_triangles());
        let problem = Subproblem::from_parts(b, Array1::zeros(6)).unwrap();
        let out = ExactSubsetSolver::new().solve(&problem).unwrap();
        assert_eq!(out, vec![-1, -1, -1, 1, 1, 1]);
        assert_eq!(ExactSubsetSolver::new().name(), "exact");
    }

    proptest! {
        #[test]
        fn exact_matches_independent_enumeration(
            k in 1usize..=10,
            seed_entries in proptest::collection::vec(-2.0f64..2.0, 110),
            workers in 1usize..20,
        ) {
            let mut b = Array2::zeros((k, k));
            for i in 0..k {
                for j in i..k {
                    let v = seed_entries[i * 10 + j];
                    b[[i, j]] = v;
                    b[[j, i]] = v;
                }
            }
            let c: Array1<f64> = (0..k).map(|i| seed_entries[100 + i]).collect();

            let (score, s) = ExactSubsetSolver::new().with_workers(workers).solve_exact(&b, &c).unwrap();
            let reference = brute_reference(&b, &c);
            prop_assert!((score - reference).abs() < 1e-9);

            let x = s.to_array();
            let recomputed = x.dot(&b.dot(&x)) + c.dot(&x);
            prop_assert!((recomputed - score).abs() < 1e-9);
        }
    }
}

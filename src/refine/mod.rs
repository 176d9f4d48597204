//! Local refinement of two-way modularity splits.
//!
//! Exact modularity maximization is NP-hard, but small problems are easy to
//! solve exhaustively. Local refinement combines the two: repeatedly pick a
//! bounded-size subset of vertices, solve *that* subproblem optimally with
//! the rest of the graph frozen, and keep the result if it improves the
//! global score.
//!
//! ## The Subproblem
//!
//! With `S` the subset and `F` the fixed vertices, the global objective
//! splits as
//!
//! ```text
//! sᵀ B s = s_Sᵀ B_SS s_S + Σ_{i∈S} (Σ_{j∈F} 2 B_ij s_j) s_i + const
//! ```
//!
//! so the solver sees a `k × k` matrix `B_SS` and a bias vector `C`. Any
//! [`SubproblemSolver`] can be plugged in; [`ExactSubsetSolver`] enumerates
//! all `2^k` assignments and is the default.
//!
//! ## Choosing Subsets
//!
//! Each iteration is anchored on a *pivot*, the unvisited vertex whose flip
//! gain is largest. [`SubsetMethod`] picks how the rest of the subset is
//! grown: along the spectral ordering, breadth-first, or simply the top gains.
//!
//! ## Usage
//!
//! ```rust
//! use modsplit::graph::Graph;
//! use modsplit::refine::{SingleLevelRefinement, SubsetMethod};
//! use modsplit::RefinementConfig;
//!
//! // Two triangles joined by one edge
//! let graph = Graph::from_unweighted_edges(
//!     6,
//!     &[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (3, 5)],
//! ).unwrap();
//!
//! let config = RefinementConfig::new()
//!     .with_seed(1)
//!     .with_iter_size(4)
//!     .with_subset_method(SubsetMethod::Bfs);
//! let outcome = SingleLevelRefinement::new(config).unwrap().run(&graph).unwrap();
//! assert_eq!(outcome.best_assignment.len(), 6);
//! ```
//!
//! ## References
//!
//! - Newman (2006). "Modularity and community structure in networks." PNAS 103(23).
//! - Shaydulin et al. (2019). "Network community detection on small quantum
//!   computers." Advanced Quantum Technologies 2(9).

mod exact;
mod gain;
mod select;
mod single_level;
mod spectral;
mod traits;

pub use exact::{optimal_assignment, ExactSubsetSolver, MAX_EXACT_SUBSET};
pub use gain::GainEstimator;
pub use select::{
    bfs_subset, percentile, pivot, spectral_threshold, top_gain_subset, Selection, SubsetMethod,
    SubsetSelector,
};
pub use single_level::{IterationRecord, RefinementOutcome, SingleLevelRefinement, StopReason};
pub use spectral::spectral_ordering;
pub use traits::{Subproblem, SubproblemSolver};

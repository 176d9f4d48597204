use thiserror::Error;

/// Result alias for `modsplit`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the modularity model, the subproblem solvers and the refinement loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Vector or matrix dimension mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// An assignment entry is not a valid spin.
    ///
    /// Accepted values are `-1`, `0` and `1`, with `0` read as `-1`.
    #[error("invalid assignment value {value} at index {index}")]
    InvalidAssignment {
        /// Position of the offending entry.
        index: usize,
        /// The offending value.
        value: i8,
    },

    /// Unknown subset selection strategy.
    #[error("invalid subset selection method '{0}' (expected spectral, bfs or top_gain)")]
    InvalidSubsetMethod(String),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Graph violates the simple undirected graph contract.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Failure raised inside a subproblem oracle.
    #[error("solver error: {0}")]
    Solver(String),

    /// A subproblem solve failed or returned a malformed assignment.
    #[error("{solver} solver failed at iteration {iteration} on subset {subset:?} (returned {returned:?}): {reason}")]
    Subproblem {
        /// Name reported by the solver.
        solver: String,
        /// Refinement iteration (1-based).
        iteration: usize,
        /// Global vertex ids of the attempted subset.
        subset: Vec<usize>,
        /// Raw values returned by the solver, empty if it raised.
        returned: Vec<i8>,
        /// What went wrong.
        reason: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

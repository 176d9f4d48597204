//! Benchmark graphs with a planted two-way split.
//!
//! These provide the reference optimum used by the early-exit check when
//! measuring how quickly refinement recovers a known answer.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::modularity::Assignment;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A generated graph together with its planted split, if any.
#[derive(Debug, Clone)]
pub struct BenchmarkGraph {
    /// Human-readable identifier.
    pub name: String,
    /// The graph.
    pub graph: Graph,
    /// Planted two-way split.
    pub solution: Option<Assignment>,
}

fn halves(left: usize, right: usize) -> Assignment {
    let mut spins = vec![-1; left];
    spins.extend(std::iter::repeat(1).take(right));
    Assignment::from_spins(spins)
}

fn clique_edges(start: usize, size: usize, edges: &mut Vec<(usize, usize)>) {
    for i in start..start + size {
        for j in i + 1..start + size {
            edges.push((i, j));
        }
    }
}

/// Two triangles joined by the edge `(2, 3)`.
pub fn two_triangles() -> Result<BenchmarkGraph> {
    let graph =
        Graph::from_unweighted_edges(6, &[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (3, 5)])?;
    Ok(BenchmarkGraph {
        name: "two_triangles".into(),
        graph,
        solution: Some(halves(3, 3)),
    })
}

/// Two cliques of `size` vertices joined by a single edge.
pub fn barbell(size: usize) -> Result<BenchmarkGraph> {
    if size < 2 {
        return Err(Error::InvalidParameter {
            name: "size",
            message: "barbell cliques need at least 2 vertices".into(),
        });
    }
    let mut edges = Vec::new();
    clique_edges(0, size, &mut edges);
    clique_edges(size, size, &mut edges);
    edges.push((size - 1, size));
    Ok(BenchmarkGraph {
        name: format!("barbell_{size}x{size}"),
        graph: Graph::from_unweighted_edges(2 * size, &edges)?,
        solution: Some(halves(size, size)),
    })
}

/// Ring of `cliques` cliques of `size` vertices.
///
/// In every clique the edge between its first two vertices is replaced by an
/// edge from its first vertex to the last vertex of the previous clique.
/// The planted split cuts the ring into two runs of whole cliques.
pub fn connected_caveman(cliques: usize, size: usize) -> Result<BenchmarkGraph> {
    if cliques < 2 || size < 3 {
        return Err(Error::InvalidParameter {
            name: "cliques/size",
            message: "need at least 2 cliques of at least 3 vertices".into(),
        });
    }
    let n = cliques * size;
    let mut edges = Vec::new();
    for c in 0..cliques {
        let start = c * size;
        for i in start..start + size {
            for j in i + 1..start + size {
                if (i, j) != (start, start + 1) {
                    edges.push((i, j));
                }
            }
        }
        edges.push((start, (start + n - 1) % n));
    }
    let left = size * cliques.div_ceil(2);
    Ok(BenchmarkGraph {
        name: format!("connected_caveman_{cliques}x{size}"),
        graph: Graph::from_unweighted_edges(n, &edges)?,
        solution: Some(halves(left, n - left)),
    })
}

/// Planted partition: vertices `0..left` and `left..left+right` are joined
/// with probability `p_in` inside a block and `p_out` across blocks.
pub fn random_partition(
    left: usize,
    right: usize,
    p_in: f64,
    p_out: f64,
    seed: u64,
) -> Result<BenchmarkGraph> {
    for (name, p) in [("p_in", p_in), ("p_out", p_out)] {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidParameter {
                name,
                message: format!("probability {p} outside [0, 1]"),
            });
        }
    }
    let n = left + right;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            let same = (i < left) == (j < left);
            if rng.random_bool(if same { p_in } else { p_out }) {
                edges.push((i, j));
            }
        }
    }
    Ok(BenchmarkGraph {
        name: format!("random_partition_{left}_{right}_seed_{seed}"),
        graph: Graph::from_unweighted_edges(n, &edges)?,
        solution: Some(halves(left, right)),
    })
}

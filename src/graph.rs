//! Immutable undirected graph used by the modularity model.
//!
//! Vertices are dense indices `0..n`. Edges carry a positive weight
//! (unit weight for unweighted input). The graph never changes during a
//! refinement run, so neighbor lists and weighted degrees are computed once.

use crate::error::{Error, Result};
use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Undirected, optionally weighted simple graph.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: UnGraph<(), f64>,
    /// Sorted, deduplicated neighbor lists.
    neighbors: Vec<Vec<usize>>,
    /// Weighted degree of each vertex.
    degrees: Vec<f64>,
    /// Sum of edge weights, each edge counted once (`m`).
    total_weight: f64,
}

impl Graph {
    /// Build a weighted graph on `n` vertices.
    ///
    /// Parallel edges are merged by summing their weights.
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        let mut inner = UnGraph::<(), f64>::with_capacity(n, edges.len());
        for _ in 0..n {
            let _ = inner.add_node(());
        }
        for &(u, v, w) in edges {
            if u >= n || v >= n {
                return Err(Error::InvalidGraph(format!(
                    "edge ({u}, {v}) references a vertex outside 0..{n}"
                )));
            }
            if u == v {
                return Err(Error::InvalidGraph(format!("self-loop on vertex {u}")));
            }
            if !w.is_finite() || w <= 0.0 {
                return Err(Error::InvalidGraph(format!(
                    "edge ({u}, {v}) has non-positive or non-finite weight {w}"
                )));
            }
            let (a, b) = (NodeIndex::new(u), NodeIndex::new(v));
            match inner.find_edge(a, b) {
                Some(e) => inner[e] += w,
                None => {
                    let _ = inner.add_edge(a, b, w);
                }
            }
        }
        Ok(Self::index(inner))
    }

    /// Build a unit-weight graph on `n` vertices.
    pub fn from_unweighted_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let weighted: Vec<(usize, usize, f64)> = edges.iter().map(|&(u, v)| (u, v, 1.0)).collect();
        Self::from_edges(n, &weighted)
    }

    /// Convert any petgraph undirected graph, treating every edge as unit weight.
    pub fn from_petgraph<N, E>(graph: &UnGraph<N, E>) -> Result<Self> {
        let edges: Vec<(usize, usize)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        Self::from_unweighted_edges(graph.node_count(), &edges)
    }

    fn index(inner: UnGraph<(), f64>) -> Self {
        let n = inner.node_count();
        let mut neighbors = vec![Vec::new(); n];
        let mut degrees = vec![0.0; n];
        let mut total_weight = 0.0;
        for edge in inner.edge_references() {
            let (i, j, w) = (edge.source().index(), edge.target().index(), *edge.weight());
            neighbors[i].push(j);
            neighbors[j].push(i);
            degrees[i] += w;
            degrees[j] += w;
            total_weight += w;
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        Self {
            inner,
            neighbors,
            degrees,
            total_weight,
        }
    }

    /// Number of vertices.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Total edge weight `m`.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Weighted degree of every vertex.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Neighbors of `v` in ascending id order.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbors[v]
    }

    /// Weighted edges `(u, v, w)` with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.inner.edge_references().map(|e| {
            let (a, b) = (e.source().index(), e.target().index());
            (a.min(b), a.max(b), *e.weight())
        })
    }

    /// Dense symmetric adjacency matrix.
    pub fn adjacency_matrix(&self) -> Array2<f64> {
        let n = self.node_count();
        let mut a = Array2::zeros((n, n));
        for (i, j, w) in self.edges() {
            a[[i, j]] += w;
            a[[j, i]] += w;
        }
        a
    }

    /// Connected components, each sorted ascending, ordered by smallest member.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut seen = vec![false; n];
        let mut components = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut stack = vec![start];
            let mut component = Vec::new();
            while let Some(v) = stack.pop() {
                component.push(v);
                for &u in &self.neighbors[v] {
                    if !seen[u] {
                        seen[u] = true;
                        stack.push(u);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Underlying petgraph representation.
    pub fn as_petgraph(&self) -> &UnGraph<(), f64> {
        &self.inner
    }
}

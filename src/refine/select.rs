//! Subset selection: which vertices to re-optimize next.
//!
//! Every iteration picks a *pivot*, the unvisited vertex with the largest
//! flip gain, and grows a subset of at most `iter_size` vertices around it:
//!
//! - **spectral**: walk outwards from the pivot's position in the spectral
//!   ordering, keeping vertices whose gain clears a threshold
//!   (25th percentile of all gains, or the minimum gain when the graph is
//!   small relative to `iter_size`).
//! - **bfs**: breadth-first over graph neighbors, FIFO discovery order.
//! - **top_gain**: the `iter_size` largest gains, ignoring locality.
//!
//! A graph with at most `iter_size` vertices always yields the whole vertex set.

use super::spectral::spectral_ordering;
use crate::error::{Error, Result};
use crate::graph::Graph;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Subset selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SubsetMethod {
    /// Pivot plus high-gain neighbors in spectral order.
    #[default]
    Spectral,
    /// Pivot plus breadth-first neighborhood.
    Bfs,
    /// Highest gains anywhere in the graph.
    TopGain,
}

impl SubsetMethod {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsetMethod::Spectral => "spectral",
            SubsetMethod::Bfs => "bfs",
            SubsetMethod::TopGain => "top_gain",
        }
    }
}

impl fmt::Display for SubsetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubsetMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "spectral" => Ok(SubsetMethod::Spectral),
            "bfs" => Ok(SubsetMethod::Bfs),
            "top_gain" => Ok(SubsetMethod::TopGain),
            other => Err(Error::InvalidSubsetMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for SubsetMethod {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

/// Outcome of one selection step.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Vertex the subset was anchored on. Must be marked visited by the caller.
    pub pivot: usize,
    /// Vertices to re-optimize, pivot first (except for `top_gain`).
    pub subset: Vec<usize>,
}

/// Chooses subproblems on one graph.
///
/// The spectral ordering depends only on the graph, so it is computed on
/// first use and reused for later iterations.
#[derive(Debug)]
pub struct SubsetSelector<'g> {
    graph: &'g Graph,
    method: SubsetMethod,
    iter_size: usize,
    ordering: OnceCell<Vec<usize>>,
}

impl<'g> SubsetSelector<'g> {
    /// Create a selector producing subsets of at most `iter_size` vertices.
    pub fn new(graph: &'g Graph, method: SubsetMethod, iter_size: usize) -> Result<Self> {
        if iter_size == 0 {
            return Err(Error::InvalidParameter {
                name: "iter_size",
                message: "must be at least 1".into(),
            });
        }
        Ok(Self {
            graph,
            method,
            iter_size,
            ordering: OnceCell::new(),
        })
    }

    /// Configured strategy.
    pub fn method(&self) -> SubsetMethod {
        self.method
    }

    /// Pick the next pivot and subset. `None` once every vertex has been a pivot.
    pub fn select(&self, gains: &[f64], visited: &[bool]) -> Result<Option<Selection>> {
        let n = self.graph.node_count();
        for len in [gains.len(), visited.len()] {
            if len != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: len,
                });
            }
        }
        let Some(pivot) = pivot(gains, visited) else {
            return Ok(None);
        };
        let subset = match self.method {
            SubsetMethod::Bfs => bfs_subset(self.graph, pivot, self.iter_size),
            SubsetMethod::TopGain => top_gain_subset(gains, self.iter_size),
            SubsetMethod::Spectral => self.spectral_subset(pivot, gains)?,
        };
        Ok(Some(Selection { pivot, subset }))
    }

    fn spectral_subset(&self, root: usize, gains: &[f64]) -> Result<Vec<usize>> {
        let n = self.graph.node_count();
        if n <= self.iter_size {
            return Ok((0..n).collect());
        }
        let threshold = spectral_threshold(gains, self.iter_size);
        let ordering = self.ordering()?;
        debug!("spectral walk from {root}, threshold {threshold}");
        Ok(walk_ordering(ordering, root, gains, threshold, self.iter_size))
    }

    fn ordering(&self) -> Result<&[usize]> {
        if self.ordering.get().is_none() {
            let order = spectral_ordering(self.graph)?;
            debug!("spectral ordering: {order:?}");
            let _ = self.ordering.set(order);
        }
        Ok(self.ordering.get().map(Vec::as_slice).unwrap_or_default())
    }
}

/// Unvisited vertex of maximum gain; ties go to the smallest id.
pub fn pivot(gains: &[f64], visited: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (v, &gain) in gains.iter().enumerate() {
        if visited[v] {
            continue;
        }
        match best {
            Some(b) if gains[b] >= gain => {}
            _ => best = Some(v),
        }
    }
    best
}

/// Breadth-first neighborhood of `root`, at most `size` vertices.
pub fn bfs_subset(graph: &Graph, root: usize, size: usize) -> Vec<usize> {
    let n = graph.node_count();
    if n <= size {
        return (0..n).collect();
    }
    let mut seen = vec![false; n];
    seen[root] = true;
    let mut subset = vec![root];
    let mut queue = VecDeque::from([root]);
    'grow: while let Some(v) = queue.pop_front() {
        for &u in graph.neighbors(v) {
            if subset.len() >= size {
                break 'grow;
            }
            if !seen[u] {
                seen[u] = true;
                subset.push(u);
                queue.push_back(u);
            }
        }
    }
    subset
}

/// The `size` vertices with the largest gains; ties go to the smallest id.
pub fn top_gain_subset(gains: &[f64], size: usize) -> Vec<usize> {
    let n = gains.len();
    if n <= size {
        return (0..n).collect();
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| gains[b].total_cmp(&gains[a]).then(a.cmp(&b)));
    order.truncate(size);
    order
}

/// Gain threshold for the spectral walk.
///
/// The 25th percentile of all gains when `0.75 n >= size`, otherwise the
/// minimum gain (every vertex qualifies).
pub fn spectral_threshold(gains: &[f64], size: usize) -> f64 {
    if 0.75 * gains.len() as f64 >= size as f64 {
        percentile(gains, 25.0)
    } else {
        gains.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Two pointers walking left and right from `root` in `ordering`.
///
/// A side that runs off the end stops; the other keeps going. The walk ends
/// when the subset is full or both sides are exhausted.
fn walk_ordering(
    ordering: &[usize],
    root: usize,
    gains: &[f64],
    threshold: f64,
    size: usize,
) -> Vec<usize> {
    let start = ordering.iter().position(|&v| v == root).unwrap_or(0);
    let mut left = start.checked_sub(1);
    let mut right = start + 1;
    let mut subset = vec![root];

    while subset.len() < size {
        if left.is_none() && right >= ordering.len() {
            warn!(
                "spectral walk from {root} exhausted with {} of {size} vertices",
                subset.len()
            );
            break;
        }
        if let Some(l) = left {
            let v = ordering[l];
            if gains[v] >= threshold {
                subset.push(v);
            }
            left = l.checked_sub(1);
        }
        if subset.len() < size && right < ordering.len() {
            let v = ordering[right];
            if gains[v] >= threshold {
                subset.push(v);
            }
            right += 1;
        }
    }
    subset
}

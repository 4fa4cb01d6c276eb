//! Tour representation and evaluation.
//!
//! A tour is a slice of node positions that must be a permutation of
//! `0..num_nodes`. It is read as a closed cycle: the edge from the last
//! entry back to the first is always part of it.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TspError;
use crate::instance::Graph;

/// Identity tour `0, 1, ..., n-1`.
pub fn identity_tour(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Uniformly random permutation of `0..n`.
pub fn random_tour<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut tour = identity_tour(n);
    tour.shuffle(rng);
    tour
}

/// Check that `tour` visits every position of `0..n` exactly once.
pub fn is_permutation(tour: &[usize], n: usize) -> bool {
    if tour.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &node in tour {
        if node >= n || seen[node] {
            return false;
        }
        seen[node] = true;
    }
    true
}

/// Validate a tour buffer against the graph it will be evaluated on.
pub fn check_tour(graph: &Graph, tour: &[usize]) -> Result<(), TspError> {
    let n = graph.num_nodes();
    if tour.len() != n {
        return Err(TspError::TourSizeMismatch {
            tour_len: tour.len(),
            num_nodes: n,
        });
    }
    if !is_permutation(tour, n) {
        return Err(TspError::NotAPermutation { num_nodes: n });
    }
    Ok(())
}

/// Represents the outcome of one algorithm run on one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of node positions
    pub tour: Vec<usize>,
    /// Closed tour length
    pub length: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Wall-clock time of the algorithm call in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            length: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a tour
    pub fn from_tour(graph: &Graph, tour: Vec<usize>, algorithm: &str) -> Self {
        let length = graph.tour_length(&tour);
        Solution {
            tour,
            length,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Check if all nodes are visited exactly once
    pub fn is_complete(&self, graph: &Graph) -> bool {
        is_permutation(&self.tour, graph.num_nodes())
    }

    /// Number of distinct node positions in the tour
    pub fn unique_nodes(&self) -> usize {
        let mut sorted = self.tour.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.len()
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Length: {:.4}", self.length)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

//! Variable Neighborhood Search.
//!
//! Each outer pass walks the shake intensity `k` from 1 to `kmax`. For every
//! `k` the best tour is copied, shaken, driven to a 2-opt local optimum and
//! compared with the best: a strictly shorter tour is adopted and `k` drops
//! back to 1, otherwise `k` grows. The run always performs `max_iterations`
//! outer passes, whether or not the last ones still improve anything.

use log::{debug, info};
use rand::prelude::*;

use super::moves::{reverse_segment, scramble_window, two_opt_delta, IMPROVEMENT_EPSILON};
use super::{Heuristic, RunStats};
use crate::config::SolverConfig;
use crate::error::TspError;
use crate::instance::Graph;
use crate::solution::check_tour;

/// Random perturbation of strength `k`.
///
/// With equal probability either reverses the segment between two random
/// positions at least two apart, or scrambles a block of `k` consecutive
/// positions (wrapping). Tours shorter than 4 are left alone.
pub fn shake<R: Rng + ?Sized>(tour: &mut [usize], k: usize, rng: &mut R) {
    let n = tour.len();
    if n < 4 {
        return;
    }

    if rng.gen_bool(0.5) {
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n);
        while i.abs_diff(j) < 2 {
            j = rng.gen_range(0..n);
        }
        reverse_segment(tour, i.min(j), i.max(j));
    } else {
        let start = rng.gen_range(0..n);
        scramble_window(tour, start, k, rng);
    }
}

/// First-improvement 2-opt descent to a local optimum.
///
/// Sweeps every `i < j` with `j + 1 < n`, so the closing edge from the last
/// position back to the first is never exchanged. Returns the number of
/// moves applied.
pub fn two_opt_local_search(graph: &Graph, tour: &mut [usize]) -> usize {
    let n = tour.len();
    if n < 4 {
        return 0;
    }

    let mut moves = 0;
    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..n - 2 {
            for j in i + 2..n - 1 {
                if two_opt_delta(graph, tour, i, j) < -IMPROVEMENT_EPSILON {
                    reverse_segment(tour, i + 1, j);
                    improved = true;
                    moves += 1;
                }
            }
        }
    }
    moves
}

/// Variable Neighborhood Search
pub struct VariableNeighborhoodSearch {
    /// Maximum shake intensity
    pub kmax: usize,
    /// Number of outer passes
    pub max_iterations: usize,
}

impl VariableNeighborhoodSearch {
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    pub fn with_params(kmax: usize, max_iterations: usize) -> Self {
        VariableNeighborhoodSearch { kmax, max_iterations }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_params(config.kmax, config.max_vns_iterations)
    }
}

impl Default for VariableNeighborhoodSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for VariableNeighborhoodSearch {
    fn run(
        &self,
        graph: &Graph,
        tour: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> Result<RunStats, TspError> {
        check_tour(graph, tour)?;

        let n = tour.len();
        let mut stats = RunStats::default();
        if n < 4 {
            return Ok(stats);
        }

        info!(
            "VNS: kmax={}, max_iterations={}, n={}",
            self.kmax, self.max_iterations, n
        );

        let mut best_length = graph.tour_length(tour);
        let mut candidate = tour.to_vec();

        for iteration in 0..self.max_iterations {
            let mut k = 1;
            while k <= self.kmax {
                candidate.copy_from_slice(tour);
                shake(&mut candidate, k, rng);
                two_opt_local_search(graph, &mut candidate);

                let candidate_length = graph.tour_length(&candidate);
                if candidate_length < best_length - IMPROVEMENT_EPSILON {
                    debug!(
                        "VNS iteration {}: k={} improved {:.4} -> {:.4}",
                        iteration, k, best_length, candidate_length
                    );
                    tour.copy_from_slice(&candidate);
                    best_length = candidate_length;
                    stats.improvements += 1;
                    k = 1;
                } else {
                    k += 1;
                }
            }

            stats.iterations += 1;
            stats.history.push(best_length);
        }

        info!(
            "VNS finished after {} passes ({} improvements), length {:.4}",
            stats.iterations, stats.improvements, best_length
        );

        Ok(stats)
    }

    fn name(&self) -> &str {
        "VNS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::is_permutation;
    use rand_chacha::ChaCha8Rng;

    fn scattered(n: usize, seed: u64) -> Graph {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let coords: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        Graph::from_coordinates(&coords)
    }

    #[test]
    fn test_shake_keeps_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut tour: Vec<usize> = (0..20).collect();
        for k in 1..=25 {
            shake(&mut tour, k, &mut rng);
            assert!(is_permutation(&tour, 20));
        }
    }

    #[test]
    fn test_local_search_reaches_fixed_point() {
        let graph = scattered(25, 4);
        let mut tour: Vec<usize> = (0..25).collect();
        let before = graph.tour_length(&tour);

        two_opt_local_search(&graph, &mut tour);

        assert!(graph.tour_length(&tour) <= before);
        for i in 0..23 {
            for j in i + 2..24 {
                assert!(two_opt_delta(&graph, &tour, i, j) >= -IMPROVEMENT_EPSILON);
            }
        }
        // a second descent finds nothing
        assert_eq!(two_opt_local_search(&graph, &mut tour), 0);
    }

    #[test]
    fn test_best_length_never_increases() {
        let graph = scattered(30, 8);
        let mut tour: Vec<usize> = (0..30).collect();
        let initial = graph.tour_length(&tour);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let stats = VariableNeighborhoodSearch::with_params(4, 6)
            .run(&graph, &mut tour, &mut rng)
            .unwrap();

        assert_eq!(stats.iterations, 6);
        assert_eq!(stats.history.len(), 6);
        assert!(stats.history[0] <= initial);
        for pair in stats.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert!((graph.tour_length(&tour) - stats.history[5]).abs() < 1e-9);
        assert!(is_permutation(&tour, 30));
    }

    #[test]
    fn test_square_instance() {
        let graph = Graph::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let mut tour = vec![0, 2, 1, 3];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        VariableNeighborhoodSearch::with_params(3, 5)
            .run(&graph, &mut tour, &mut rng)
            .unwrap();

        assert!(is_permutation(&tour, 4));
        assert!(graph.tour_length(&tour) >= 4.0 - 1e-9);
    }

    #[test]
    fn test_singleton_returns_immediately() {
        let graph = Graph::from_coordinates(&[(3.0, 3.0)]);
        let mut tour = vec![0];
        let stats = VariableNeighborhoodSearch::new()
            .run(&graph, &mut tour, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap();
        assert_eq!(tour, vec![0]);
        assert_eq!(stats.iterations, 0);
    }
}

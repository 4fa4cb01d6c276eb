//! Boundary between the drivers and the heuristics.
//!
//! [`solve`] validates the instance, hands the identity tour to the chosen
//! algorithm, times the call and recomputes the final length.

use std::time::Instant;

use log::{info, warn};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::SolverConfig;
use crate::error::TspError;
use crate::heuristics::Algorithm;
use crate::instance::Graph;
use crate::solution::{identity_tour, Solution};

/// Below this size VNS tends to need parameter tuning.
pub const SMALL_INSTANCE_WARNING: usize = 100;

/// Seeded generator. Without a seed one is drawn from entropy and logged so
/// the run can be repeated.
pub fn seeded_rng(seed: Option<u64>) -> (ChaCha8Rng, u64) {
    let seed = seed.unwrap_or_else(|| {
        let drawn = rand::thread_rng().next_u64();
        info!("No seed configured, using {}", drawn);
        drawn
    });
    (ChaCha8Rng::seed_from_u64(seed), seed)
}

/// Reject graphs larger than `capacity` nodes.
pub fn check_capacity(graph: &Graph, capacity: usize) -> Result<(), TspError> {
    let nodes = graph.num_nodes();
    if nodes > capacity {
        return Err(TspError::CapacityExceeded { nodes, capacity });
    }
    Ok(())
}

/// Run one algorithm on `graph` starting from the identity tour.
pub fn solve(
    graph: &Graph,
    algorithm: Algorithm,
    config: &SolverConfig,
    rng: &mut dyn RngCore,
) -> Result<Solution, TspError> {
    if graph.is_empty() {
        return Err(TspError::EmptyGraph);
    }
    check_capacity(graph, config.max_nodes)?;

    if graph.num_nodes() < SMALL_INSTANCE_WARNING {
        warn!(
            "Instance '{}' has only {} nodes; VNS may be unstable without parameter tuning",
            graph.name,
            graph.num_nodes()
        );
    }

    let heuristic = algorithm.build(config);
    let mut tour = identity_tour(graph.num_nodes());

    info!("Running {} on '{}' ({} nodes)", heuristic.name(), graph.name, graph.num_nodes());
    let start = Instant::now();
    let stats = heuristic.run(graph, &mut tour, rng)?;
    let elapsed = start.elapsed().as_secs_f64();

    let mut solution = Solution::from_tour(graph, tour, algorithm.short_name());
    solution.computation_time = elapsed;
    solution.iterations = Some(stats.iterations);

    info!(
        "{} on '{}': length {:.4} in {:.3}s",
        algorithm, graph.name, solution.length, elapsed
    );

    Ok(solution)
}

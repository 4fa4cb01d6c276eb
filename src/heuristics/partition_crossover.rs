//! Steady-state genetic search with a nearest-node partition crossover.
//!
//! The population holds `population_size` tours with cached lengths. Member 0
//! is the incoming tour and the others are uniformly random permutations.
//! Each generation two distinct parents are drawn, crossed into two offspring
//! and the offspring overwrite the two longest members. The best member is
//! written back into the caller's tour buffer at the end.

use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::prelude::*;

use super::{Heuristic, RunStats};
use crate::config::{ConfigError, SolverConfig};
use crate::error::TspError;
use crate::instance::Graph;
use crate::solution::{check_tour, random_tour};

/// A population member
#[derive(Debug, Clone)]
pub struct Individual {
    pub tour: Vec<usize>,
    /// Closed tour length, lower is better
    pub length: f64,
}

impl Individual {
    pub fn new(graph: &Graph, tour: Vec<usize>) -> Self {
        let length = graph.tour_length(&tour);
        Individual { tour, length }
    }
}

/// Unmarked node of `order` nearest to `tail`. Ties keep the first one met.
fn nearest_unmarked(graph: &Graph, order: &[usize], marked: &[bool], tail: usize) -> Option<usize> {
    order
        .iter()
        .copied()
        .filter(|&node| !marked[node])
        .min_by_key(|&node| OrderedFloat(graph.distance(tail, node)))
}

/// Cross two parents into two offspring.
///
/// Both offspring start at the same random node. Turns alternate: the first
/// offspring takes the unmarked node nearest its tail, scanning `parent2`'s
/// order, then the second does the same scanning `parent1`'s order. A node is
/// marked as soon as either offspring takes it. Once every node is marked,
/// each offspring is completed with the nodes its sibling claimed, in the
/// order they were claimed, so both are permutations of `0..n`.
pub fn crossover<R: Rng + ?Sized>(
    graph: &Graph,
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let start = parent1[rng.gen_range(0..n)];
    let mut marked = vec![false; n];
    marked[start] = true;

    let mut claims1 = vec![start];
    let mut claims2 = vec![start];
    let mut remaining = n - 1;
    let mut first_turn = true;

    while remaining > 0 {
        let (claims, order) = if first_turn {
            (&mut claims1, parent2)
        } else {
            (&mut claims2, parent1)
        };
        let tail = claims[claims.len() - 1];
        if let Some(node) = nearest_unmarked(graph, order, &marked, tail) {
            marked[node] = true;
            claims.push(node);
            remaining -= 1;
        }
        first_turn = !first_turn;
    }

    let mut child1 = claims1.clone();
    child1.extend(claims2.iter().skip(1));
    let mut child2 = claims2;
    child2.extend(claims1.iter().skip(1));
    (child1, child2)
}

/// Genetic search driven by [`crossover`]
pub struct PartitionCrossover {
    /// Number of tours kept in the population
    pub population_size: usize,
    /// Maximum number of generations
    pub max_generations: usize,
    /// Stop once the best length falls below this value
    pub fitness_threshold: f64,
}

impl PartitionCrossover {
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    pub fn with_params(population_size: usize, max_generations: usize, fitness_threshold: f64) -> Self {
        PartitionCrossover {
            population_size,
            max_generations,
            fitness_threshold,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_params(
            config.population_size,
            config.max_generations,
            config.fitness_threshold,
        )
    }

    /// Incoming tour plus `population_size - 1` random permutations.
    pub fn initial_population<R: Rng + ?Sized>(&self, graph: &Graph, tour: &[usize], rng: &mut R) -> Vec<Individual> {
        let n = tour.len();
        let mut population = Vec::with_capacity(self.population_size);
        population.push(Individual::new(graph, tour.to_vec()));
        while population.len() < self.population_size {
            population.push(Individual::new(graph, random_tour(n, rng)));
        }
        population
    }
}

impl Default for PartitionCrossover {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices of the longest and second longest members.
fn two_weakest(population: &[Individual]) -> (usize, usize) {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(population[i].length)));
    (order[0], order[1])
}

fn best_index(population: &[Individual]) -> usize {
    population
        .iter()
        .enumerate()
        .min_by_key(|(_, ind)| OrderedFloat(ind.length))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

impl Heuristic for PartitionCrossover {
    fn run(
        &self,
        graph: &Graph,
        tour: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> Result<RunStats, TspError> {
        check_tour(graph, tour)?;
        if self.population_size < 2 {
            return Err(ConfigError::Invalid(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            ))
            .into());
        }

        let n = tour.len();
        let mut stats = RunStats::default();
        if n < 2 {
            return Ok(stats);
        }

        info!(
            "GPX: population={}, max_generations={}, threshold={}, n={}",
            self.population_size, self.max_generations, self.fitness_threshold, n
        );

        let mut population = self.initial_population(graph, tour, rng);
        let mut best = population[best_index(&population)].length;

        for generation in 0..self.max_generations {
            if best < self.fitness_threshold {
                debug!("GPX: threshold reached at generation {}", generation);
                break;
            }

            let p1 = rng.gen_range(0..population.len());
            let mut p2 = rng.gen_range(0..population.len() - 1);
            if p2 >= p1 {
                p2 += 1;
            }

            let (child1, child2) = crossover(graph, &population[p1].tour, &population[p2].tour, rng);
            let (w1, w2) = two_weakest(&population);
            population[w1] = Individual::new(graph, child1);
            population[w2] = Individual::new(graph, child2);

            let generation_best = population[best_index(&population)].length;
            if generation_best < best {
                stats.improvements += 1;
            }
            best = generation_best;
            stats.iterations += 1;
            stats.history.push(best);
        }

        let winner = &population[best_index(&population)];
        tour.copy_from_slice(&winner.tour);

        info!(
            "GPX finished after {} generations, length {:.4}",
            stats.iterations, winner.length
        );

        Ok(stats)
    }

    fn name(&self) -> &str {
        "GPX"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::is_permutation;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn scattered(n: usize, seed: u64) -> Graph {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let coords: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        Graph::from_coordinates(&coords)
    }

    #[test]
    fn test_crossover_shares_start_node() {
        let graph = scattered(9, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p1: Vec<usize> = (0..9).collect();
        let p2: Vec<usize> = (0..9).rev().collect();
        let (c1, c2) = crossover(&graph, &p1, &p2, &mut rng);
        assert_eq!(c1[0], c2[0]);
        assert!(is_permutation(&c1, 9));
        assert!(is_permutation(&c2, 9));
    }

    #[test]
    fn test_initial_population_keeps_incoming_tour() {
        let graph = scattered(12, 2);
        let gpx = PartitionCrossover::with_params(6, 10, 0.0);
        let tour: Vec<usize> = (0..12).rev().collect();
        let population = gpx.initial_population(&graph, &tour, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(population.len(), 6);
        assert_eq!(population[0].tour, tour);
        for ind in &population {
            assert!(is_permutation(&ind.tour, 12));
            assert!((ind.length - graph.tour_length(&ind.tour)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_best_never_worse_than_start() {
        let graph = scattered(20, 5);
        let mut tour: Vec<usize> = (0..20).collect();
        let initial = graph.tour_length(&tour);

        let stats = PartitionCrossover::with_params(10, 50, 0.0)
            .run(&graph, &mut tour, &mut ChaCha8Rng::seed_from_u64(5))
            .unwrap();

        assert!(is_permutation(&tour, 20));
        assert_eq!(stats.iterations, 50);
        assert!(graph.tour_length(&tour) <= initial + 1e-9);
        for pair in stats.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_threshold_stops_early() {
        let graph = scattered(15, 7);
        let mut tour: Vec<usize> = (0..15).collect();
        let stats = PartitionCrossover::with_params(8, 100, f64::INFINITY)
            .run(&graph, &mut tour, &mut ChaCha8Rng::seed_from_u64(7))
            .unwrap();
        assert_eq!(stats.iterations, 0);
        assert!(is_permutation(&tour, 15));
    }

    #[test]
    fn test_square_instance() {
        let graph = Graph::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let mut tour = vec![0, 2, 1, 3];
        PartitionCrossover::with_params(6, 30, 0.01)
            .run(&graph, &mut tour, &mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();
        assert!(is_permutation(&tour, 4));
        assert!(graph.tour_length(&tour) >= 4.0 - 1e-9);
    }

    #[test]
    fn test_tiny_population_rejected() {
        let graph = scattered(5, 0);
        let mut tour: Vec<usize> = (0..5).collect();
        let result = PartitionCrossover::with_params(1, 10, 0.0).run(&graph, &mut tour, &mut ChaCha8Rng::seed_from_u64(0));
        assert!(matches!(result, Err(TspError::Config(_))));
    }

    #[test]
    fn test_singleton_returns_immediately() {
        let graph = Graph::from_coordinates(&[(0.0, 0.0)]);
        let mut tour = vec![0];
        let stats = PartitionCrossover::new()
            .run(&graph, &mut tour, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap();
        assert_eq!(tour, vec![0]);
        assert_eq!(stats.iterations, 0);
    }

    proptest! {
        #[test]
        fn prop_offspring_are_permutations(seed in any::<u64>(), n in 1usize..40) {
            let graph = scattered(n, seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p1 = random_tour(n, &mut rng);
            let p2 = random_tour(n, &mut rng);
            let (c1, c2) = crossover(&graph, &p1, &p2, &mut rng);
            prop_assert!(is_permutation(&c1, n));
            prop_assert!(is_permutation(&c2, n));
        }
    }
}
